//! Landing page CMS blocks, keyed by section name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LandingPageContent {
    pub id: Uuid,
    pub section: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub video_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert payload: absent fields are left untouched on update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertLandingContent {
    #[validate(length(min = 1, message = "Section is required"))]
    pub section: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub video_url: Option<String>,
}
