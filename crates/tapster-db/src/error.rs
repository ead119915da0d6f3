//! Database-specific error types and conversions.

use tapster_core::error::TapsterError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for TapsterError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TapsterError::NotFound { entity, id },
            other => TapsterError::Database(other.to_string()),
        }
    }
}
