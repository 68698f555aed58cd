//! Authentication error types.

use homestay_core::error::HomestayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("authentication required")]
    MissingSession,

    #[error("session has expired")]
    SessionExpired,

    #[error("password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("missing permission: {0}")]
    Forbidden(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for HomestayError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::MissingSession | AuthError::SessionExpired => {
                HomestayError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::WeakPassword(_) => HomestayError::Validation {
                message: err.to_string(),
            },
            AuthError::Forbidden(_) => HomestayError::AuthorizationDenied {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => HomestayError::Crypto(msg),
        }
    }
}
