//! HTTP error mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use homestay_core::error::HomestayError;
use homestay_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] HomestayError),

    /// Third-party failure surfaced with a fixed client message.
    #[error("{message}: {detail}")]
    Upstream {
        message: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Domain(HomestayError::validation(message))
    }

    pub fn upstream(message: &'static str, detail: impl ToString) -> Self {
        ApiError::Upstream {
            message,
            detail: detail.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Domain(err) => match err {
                HomestayError::Validation { message } => {
                    (StatusCode::BAD_REQUEST, json!({ "error": message }))
                }
                HomestayError::InvalidInput(errors) => (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "Invalid input", "details": errors }),
                ),
                HomestayError::AuthenticationFailed { reason } => {
                    (StatusCode::UNAUTHORIZED, json!({ "error": reason }))
                }
                HomestayError::AuthorizationDenied { reason } => {
                    (StatusCode::FORBIDDEN, json!({ "error": reason }))
                }
                HomestayError::NotFound { entity, .. } => (
                    StatusCode::NOT_FOUND,
                    json!({ "error": format!("{entity} not found") }),
                ),
                HomestayError::AlreadyExists { entity } => (
                    StatusCode::CONFLICT,
                    json!({ "error": format!("{entity} already exists") }),
                ),
                other => {
                    error!(error = %other, "Request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "error": "Internal server error" }),
                    )
                }
            },
            ApiError::Upstream { message, detail } => {
                error!(%detail, "{message}");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Start-up failures reported by the binary.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
