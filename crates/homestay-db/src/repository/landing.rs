//! SurrealDB implementation of [`LandingPageRepository`].
//!
//! One record per section. Upserts look the section up first: a miss
//! creates the block, a hit patches only the fields that were supplied.

use chrono::{DateTime, Utc};
use homestay_core::error::HomestayResult;
use homestay_core::models::landing::{LandingPageContent, UpsertLandingContent};
use homestay_core::repository::LandingPageRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct LandingRow {
    section: String,
    title: Option<String>,
    subtitle: Option<String>,
    description: Option<String>,
    images: Vec<String>,
    video_url: Option<String>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct LandingRowWithId {
    record_id: String,
    section: String,
    title: Option<String>,
    subtitle: Option<String>,
    description: Option<String>,
    images: Vec<String>,
    video_url: Option<String>,
    updated_at: DateTime<Utc>,
}

impl LandingRow {
    fn into_content(self, id: Uuid) -> LandingPageContent {
        LandingPageContent {
            id,
            section: self.section,
            title: self.title,
            subtitle: self.subtitle,
            description: self.description,
            images: self.images,
            video_url: self.video_url,
            updated_at: self.updated_at,
        }
    }
}

impl LandingRowWithId {
    fn try_into_content(self) -> Result<LandingPageContent, DbError> {
        let id = parse_uuid(&self.record_id, "landing_page")?;
        Ok(LandingRow {
            section: self.section,
            title: self.title,
            subtitle: self.subtitle,
            description: self.description,
            images: self.images,
            video_url: self.video_url,
            updated_at: self.updated_at,
        }
        .into_content(id))
    }
}

/// SurrealDB implementation of the landing page repository.
#[derive(Clone)]
pub struct SurrealLandingPageRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLandingPageRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_section(&self, section: &str) -> Result<Option<LandingPageContent>, DbError> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM landing_page WHERE section = $section")
            .bind(("section", section.to_string()))
            .await?;

        let rows: Vec<LandingRowWithId> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(LandingRowWithId::try_into_content)
            .transpose()
    }

    async fn insert(&self, input: UpsertLandingContent) -> Result<LandingPageContent, DbError> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('landing_page', $id) SET \
                 section = $section, \
                 title = $title, \
                 subtitle = $subtitle, \
                 description = $description, \
                 images = $images, \
                 video_url = $video_url",
            )
            .bind(("id", id_str.clone()))
            .bind(("section", input.section))
            .bind(("title", input.title))
            .bind(("subtitle", input.subtitle))
            .bind(("description", input.description))
            .bind(("images", input.images.unwrap_or_default()))
            .bind(("video_url", input.video_url))
            .await?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("landing_page", e))?;

        let rows: Vec<LandingRow> = result.take(0)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("landing_page", &id_str))?;

        Ok(row.into_content(id))
    }

    async fn patch(
        &self,
        id: Uuid,
        input: UpsertLandingContent,
    ) -> Result<LandingPageContent, DbError> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.subtitle.is_some() {
            sets.push("subtitle = $subtitle");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.images.is_some() {
            sets.push("images = $images");
        }
        if input.video_url.is_some() {
            sets.push("video_url = $video_url");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('landing_page', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(subtitle) = input.subtitle {
            builder = builder.bind(("subtitle", subtitle));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(images) = input.images {
            builder = builder.bind(("images", images));
        }
        if let Some(video_url) = input.video_url {
            builder = builder.bind(("video_url", video_url));
        }

        let result = builder.await?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("landing_page", e))?;

        let rows: Vec<LandingRow> = result.take(0)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("landing_page", &id_str))?;

        Ok(row.into_content(id))
    }
}

impl<C: Connection> LandingPageRepository for SurrealLandingPageRepository<C> {
    async fn list(&self) -> HomestayResult<Vec<LandingPageContent>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM landing_page ORDER BY section ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LandingRowWithId> = result.take(0).map_err(DbError::from)?;
        let blocks = rows
            .into_iter()
            .map(|row| row.try_into_content())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(blocks)
    }

    async fn upsert(&self, input: UpsertLandingContent) -> HomestayResult<LandingPageContent> {
        let block = match self.find_section(&input.section).await? {
            Some(existing) => {
                debug!(section = %input.section, "Updating landing page section");
                self.patch(existing.id, input).await?
            }
            None => {
                debug!(section = %input.section, "Creating landing page section");
                self.insert(input).await?
            }
        };
        Ok(block)
    }
}
