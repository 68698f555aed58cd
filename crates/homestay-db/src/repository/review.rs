//! SurrealDB implementation of [`ReviewRepository`].
//!
//! Sorting cannot be bound as a query parameter, so the ORDER BY clause is
//! assembled from [`ReviewSortField::column`] and [`SortOrder::keyword`],
//! both of which only ever yield fixed identifiers.
//!
//! [`ReviewSortField::column`]: homestay_core::models::review::ReviewSortField::column
//! [`SortOrder::keyword`]: homestay_core::models::review::SortOrder::keyword

use chrono::{DateTime, Utc};
use homestay_core::error::HomestayResult;
use homestay_core::models::review::{CreateReview, Review, ReviewListQuery, ReviewPatch};
use homestay_core::repository::{PaginatedResult, ReviewRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct ReviewRow {
    user_id: String,
    rating: u32,
    title: Option<String>,
    review_text: String,
    stay_duration: String,
    stay_period: String,
    nationality: String,
    country_flag: String,
    approved: bool,
    date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ReviewRowWithId {
    record_id: String,
    user_id: String,
    rating: u32,
    title: Option<String>,
    review_text: String,
    stay_duration: String,
    stay_period: String,
    nationality: String,
    country_flag: String,
    approved: bool,
    date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self, id: Uuid) -> Result<Review, DbError> {
        Ok(Review {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            rating: self.rating,
            title: self.title,
            review_text: self.review_text,
            stay_duration: self.stay_duration,
            stay_period: self.stay_period,
            nationality: self.nationality,
            country_flag: self.country_flag,
            approved: self.approved,
            date: self.date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ReviewRowWithId {
    fn try_into_review(self) -> Result<Review, DbError> {
        let id = parse_uuid(&self.record_id, "review")?;
        ReviewRow {
            user_id: self.user_id,
            rating: self.rating,
            title: self.title,
            review_text: self.review_text,
            stay_duration: self.stay_duration,
            stay_period: self.stay_period,
            nationality: self.nationality,
            country_flag: self.country_flag,
            approved: self.approved,
            date: self.date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_review(id)
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Review repository.
#[derive(Clone)]
pub struct SurrealReviewRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReviewRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn count(&self, filter: &str, user_id: Option<String>) -> Result<u64, DbError> {
        let query = format!("SELECT count() AS total FROM review {filter} GROUP ALL");
        let mut builder = self.db.query(&query);
        if let Some(user_id) = user_id {
            builder = builder.bind(("user_id", user_id));
        }

        let mut result = builder.await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn insert(&self, input: CreateReview) -> Result<Review, DbError> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('review', $id) SET \
                 user_id = $user_id, \
                 rating = $rating, \
                 title = $title, \
                 review_text = $review_text, \
                 stay_duration = $stay_duration, \
                 stay_period = $stay_period, \
                 nationality = $nationality, \
                 country_flag = $country_flag, \
                 approved = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("rating", input.rating))
            .bind(("title", input.title))
            .bind(("review_text", input.review_text))
            .bind(("stay_duration", input.stay_duration))
            .bind(("stay_period", input.stay_period))
            .bind(("nationality", input.nationality))
            .bind(("country_flag", input.country_flag))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("review", e))?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("review", &id_str))?;

        row.into_review(id)
    }
}

impl<C: Connection> ReviewRepository for SurrealReviewRepository<C> {
    async fn create(&self, input: CreateReview) -> HomestayResult<Review> {
        let user_id = input.user_id;
        match self.insert(input).await {
            Ok(review) => Ok(review),
            // A concurrent first submission by the same user either trips
            // the unique index or loses the transaction race.
            Err(e) if e.is_write_conflict() => {
                if self.exists_for_user(user_id).await? {
                    Err(DbError::Duplicate {
                        entity: "review".into(),
                    }
                    .into())
                } else {
                    Err(e.into())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_id(&self, id: Uuid) -> HomestayResult<Review> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('review', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("review", &id_str))?;

        Ok(row.into_review(id)?)
    }

    async fn get_by_user(&self, user_id: Uuid) -> HomestayResult<Review> {
        let user_id_str = user_id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM review WHERE user_id = $user_id")
            .bind(("user_id", user_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("review", format!("user_id={user_id_str}")))?;

        Ok(row.try_into_review()?)
    }

    async fn exists_for_user(&self, user_id: Uuid) -> HomestayResult<bool> {
        let total = self
            .count("WHERE user_id = $user_id", Some(user_id.to_string()))
            .await?;
        Ok(total > 0)
    }

    async fn list(&self, query: ReviewListQuery) -> HomestayResult<PaginatedResult<Review>> {
        let filter = if query.approved_only {
            "WHERE approved = true"
        } else {
            ""
        };

        let total = self.count(filter, None).await?;
        if query.pagination.offset >= total {
            return Ok(PaginatedResult {
                items: Vec::new(),
                total,
                offset: query.pagination.offset,
                limit: query.pagination.limit,
            });
        }

        let sql = format!(
            "SELECT meta::id(id) AS record_id, * FROM review {filter} \
             ORDER BY {} {} \
             LIMIT $limit START $offset",
            query.sort.column(),
            query.order.keyword(),
        );
        let mut result = self
            .db
            .query(&sql)
            .bind(("limit", query.pagination.limit))
            .bind(("offset", query.pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_review())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: query.pagination.offset,
            limit: query.pagination.limit,
        })
    }

    async fn update(&self, id: Uuid, patch: ReviewPatch) -> HomestayResult<Review> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if patch.rating.is_some() {
            sets.push("rating = $rating");
        }
        if patch.review_text.is_some() {
            sets.push("review_text = $review_text");
        }
        if patch.approved.is_some() {
            sets.push("approved = $approved");
        }
        if patch.stay_duration.is_some() {
            sets.push("stay_duration = $stay_duration");
        }
        if patch.nationality.is_some() {
            sets.push("nationality = $nationality");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('review', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(rating) = patch.rating {
            builder = builder.bind(("rating", rating));
        }
        if let Some(review_text) = patch.review_text {
            builder = builder.bind(("review_text", review_text));
        }
        if let Some(approved) = patch.approved {
            builder = builder.bind(("approved", approved));
        }
        if let Some(stay_duration) = patch.stay_duration {
            builder = builder.bind(("stay_duration", stay_duration));
        }
        if let Some(nationality) = patch.nationality {
            builder = builder.bind(("nationality", nationality));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("review", e))?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("review", &id_str))?;

        Ok(row.into_review(id)?)
    }

    async fn delete(&self, id: Uuid) -> HomestayResult<()> {
        // Existence check first so a missing review reports NotFound.
        self.get_by_id(id).await?;

        self.db
            .query("DELETE type::record('review', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement("review", e))?;

        Ok(())
    }
}
