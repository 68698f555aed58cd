//! Review domain model.
//!
//! A review belongs to exactly one user and starts unapproved. After
//! creation only moderators change it, through [`ReviewPatch`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::error::{HomestayError, HomestayResult};
use crate::models::user::UserSummary;
use crate::repository::Pagination;

pub const MIN_REVIEW_TEXT_LEN: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rating: u32,
    pub title: Option<String>,
    pub review_text: String,
    pub stay_duration: String,
    pub stay_period: String,
    pub nationality: String,
    pub country_flag: String,
    pub approved: bool,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review as returned over HTTP, with its author's public details.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    pub review: Review,
    pub user: Option<UserSummary>,
}

fn default_rating() -> u32 {
    5
}

/// Submission payload. The author comes from the session, never the body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReview {
    #[validate(length(min = 1, message = "Stay duration is required"))]
    pub stay_duration: String,
    #[validate(length(min = 1, message = "Stay period is required"))]
    pub stay_period: String,
    #[serde(default = "default_rating")]
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u32,
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Nationality is required"))]
    pub nationality: String,
    #[validate(length(min = 1, message = "Country flag is required"))]
    pub country_flag: String,
    #[validate(length(min = 10, message = "Review text must be at least 10 characters"))]
    pub review_text: String,
}

impl SubmitReview {
    pub fn into_create(self, user_id: Uuid) -> CreateReview {
        CreateReview {
            user_id,
            rating: self.rating,
            title: self.title.filter(|t| !t.trim().is_empty()),
            review_text: self.review_text,
            stay_duration: self.stay_duration,
            stay_period: self.stay_period,
            nationality: self.nationality,
            country_flag: self.country_flag,
        }
    }
}

/// Insert input. New reviews are always stored unapproved.
#[derive(Debug, Clone)]
pub struct CreateReview {
    pub user_id: Uuid,
    pub rating: u32,
    pub title: Option<String>,
    pub review_text: String,
    pub stay_duration: String,
    pub stay_period: String,
    pub nationality: String,
    pub country_flag: String,
}

/// Moderator update, projected from an arbitrary JSON body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewPatch {
    pub rating: Option<u32>,
    pub review_text: Option<String>,
    pub approved: Option<bool>,
    pub stay_duration: Option<String>,
    pub nationality: Option<String>,
}

impl ReviewPatch {
    /// Keys a moderator may set. `comment` is an alias of `reviewText`.
    pub const ALLOWED_FIELDS: &'static [&'static str] = &[
        "rating",
        "reviewText",
        "comment",
        "approved",
        "stayDuration",
        "nationality",
    ];

    /// Project `body` onto [`Self::ALLOWED_FIELDS`], ignoring every other
    /// key. Fails if nothing survives the projection or a kept value has
    /// the wrong shape.
    pub fn from_json(body: &Value) -> HomestayResult<Self> {
        let object = body
            .as_object()
            .ok_or_else(|| HomestayError::validation("Request body must be a JSON object"))?;

        let mut patch = Self::default();
        for (key, value) in object {
            match key.as_str() {
                "rating" => patch.rating = Some(parse_rating(value)?),
                "reviewText" | "comment" => {
                    let text = parse_string(key, value)?;
                    if text.chars().count() < MIN_REVIEW_TEXT_LEN {
                        return Err(HomestayError::validation(
                            "Review text must be at least 10 characters",
                        ));
                    }
                    patch.review_text = Some(text);
                }
                "approved" => {
                    patch.approved = Some(value.as_bool().ok_or_else(|| {
                        HomestayError::validation("approved must be a boolean")
                    })?)
                }
                "stayDuration" => patch.stay_duration = Some(parse_string(key, value)?),
                "nationality" => patch.nationality = Some(parse_string(key, value)?),
                _ => {}
            }
        }

        if patch.is_empty() {
            return Err(HomestayError::validation(
                "No valid fields provided for update",
            ));
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn parse_rating(value: &Value) -> HomestayResult<u32> {
    value
        .as_u64()
        .filter(|r| (1..=5).contains(r))
        .map(|r| r as u32)
        .ok_or_else(|| HomestayError::validation("Rating must be an integer between 1 and 5"))
}

fn parse_string(key: &str, value: &Value) -> HomestayResult<String> {
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(HomestayError::validation(format!(
            "{key} must be a non-empty string"
        ))),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewSortField {
    #[default]
    Date,
    Rating,
    CreatedAt,
    Id,
}

impl ReviewSortField {
    /// Unknown or missing names fall back to [`ReviewSortField::Date`].
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("rating") => Self::Rating,
            Some("createdAt") => Self::CreatedAt,
            Some("id") => Self::Id,
            _ => Self::Date,
        }
    }

    /// Storage column this field sorts on.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Rating => "rating",
            Self::CreatedAt => "created_at",
            Self::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only the exact token `DESC` sorts descending.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("DESC") => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Raw listing query string, as sent by the admin data provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewListParams {
    #[serde(rename = "currentPage")]
    pub current_page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
    #[serde(rename = "_sort")]
    pub sort: Option<String>,
    #[serde(rename = "_order")]
    pub order: Option<String>,
}

/// Normalised listing query handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewListQuery {
    pub pagination: Pagination,
    pub sort: ReviewSortField,
    pub order: SortOrder,
    pub approved_only: bool,
}

impl ReviewListQuery {
    pub fn from_params(params: &ReviewListParams, approved_only: bool) -> Self {
        Self {
            pagination: Pagination::from_page_params(
                params.current_page.as_deref(),
                params.page_size.as_deref(),
            ),
            sort: ReviewSortField::from_param(params.sort.as_deref()),
            order: SortOrder::from_param(params.order.as_deref()),
            approved_only,
        }
    }
}
