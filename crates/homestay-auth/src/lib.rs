//! Homestay Auth: email/password accounts, opaque session tokens and
//! role-based permission checks.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{
    AuthService, AuthenticatedSession, IssuedSession, SessionContext, authorize,
    require_moderator, require_role,
};
