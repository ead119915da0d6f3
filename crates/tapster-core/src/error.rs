//! Error types for the Tapster system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TapsterError {
    #[error("Caller is not authenticated")]
    Unauthenticated,

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TapsterError {
    /// Stable wire code for the error, as consumed by transport layers.
    ///
    /// Identity-provider and database failures both surface as
    /// `internal`: callers are never told which backend fell over.
    pub fn code(&self) -> &'static str {
        match self {
            TapsterError::Unauthenticated => "unauthenticated",
            TapsterError::PermissionDenied { .. } => "permission-denied",
            TapsterError::InvalidArgument { .. } => "invalid-argument",
            TapsterError::NotFound { .. } => "not-found",
            TapsterError::Database(_) | TapsterError::Identity(_) | TapsterError::Internal(_) => {
                "internal"
            }
        }
    }
}

pub type TapsterResult<T> = Result<T, TapsterError>;
