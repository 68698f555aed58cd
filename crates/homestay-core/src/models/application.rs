//! Application (lead intake) domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Approved => "APPROVED",
            ApplicationStatus::Rejected => "REJECTED",
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ApplicationStatus::Pending),
            "APPROVED" => Ok(ApplicationStatus::Approved),
            "REJECTED" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown application status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub whats_app: Option<String>,
    pub start_date: DateTime<Utc>,
    pub duration: String,
    pub program: String,
    pub message: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public intake form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplication {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub whats_app: Option<String>,
    #[serde(deserialize_with = "deserialize_start_date")]
    pub start_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "Duration is required"))]
    pub duration: String,
    #[validate(length(min = 1, message = "Program is required"))]
    pub program: String,
    pub message: Option<String>,
}

/// Moderator edit. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateApplication {
    pub status: Option<ApplicationStatus>,
    #[validate(length(min = 1, message = "Program must not be empty"))]
    pub program: Option<String>,
    #[validate(length(min = 1, message = "Duration must not be empty"))]
    pub duration: Option<String>,
}

/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date
/// (taken as midnight UTC).
fn deserialize_start_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_start_date(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_start_date(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid start date: {raw}"))
}
