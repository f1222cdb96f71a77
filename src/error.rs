use thiserror::Error;
use uuid::Uuid;

use crate::models::ValidationError;

/// Top-level error for storage and CLI operations.
///
/// Validation failures stay distinguishable from connectivity/storage
/// failures: the former mean the record itself is wrong and must be
/// corrected, the latter may warrant a retry by the caller.
#[derive(Debug, Error)]
pub enum NudgeError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("record not found: {0}")]
    NotFound(Uuid),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
