//! Domain models.
//!
//! Request payloads that come straight from HTTP carry `validator`
//! rules; storage inputs (`Create*`) are built from them after validation.

pub mod application;
pub mod landing;
pub mod review;
pub mod session;
pub mod user;
