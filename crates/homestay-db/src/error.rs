//! Database-specific error types and conversions.

use homestay_core::error::HomestayError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated on {entity}")]
    Duplicate { entity: String },
}

impl DbError {
    /// Classify a failed statement. Unique index violations become
    /// [`DbError::Duplicate`]; anything else is a plain query failure.
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            DbError::Duplicate {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }

    /// True for optimistic-transaction write conflicts, which a concurrent
    /// writer to the same key or index entry can trigger.
    pub(crate) fn is_write_conflict(&self) -> bool {
        let message = match self {
            DbError::Surreal(err) => err.to_string(),
            DbError::Query(message) => message.clone(),
            _ => return false,
        };
        message.contains("Transaction conflict") || message.contains("Write conflict")
    }

    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for HomestayError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => HomestayError::NotFound { entity, id },
            DbError::Duplicate { entity } => HomestayError::AlreadyExists { entity },
            other => HomestayError::Database(other.to_string()),
        }
    }
}

/// Parse a UUID stored as a string column.
pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<uuid::Uuid, DbError> {
    uuid::Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}
