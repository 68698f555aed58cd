//! Homestay Database: SurrealDB connection management, schema
//! migrations and repository implementations of the `homestay-core`
//! traits.

mod connection;
mod error;
mod schema;

pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{latest_version, run_migrations};
