//! Homestay Core: domain models, validation rules, access control and
//! repository traits shared by every crate in the workspace.

pub mod access;
pub mod error;
pub mod models;
pub mod repository;

pub use error::{HomestayError, HomestayResult};
