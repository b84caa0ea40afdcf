//! Error types for the curation core

use thiserror::Error;

/// Failures reading or writing the JSON store files
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key that cannot be used as a file name
    #[error("invalid store key '{0}'")]
    InvalidKey(String),
}

/// Curation operation errors
#[derive(Debug, Error)]
pub enum CurationError {
    /// Unknown collaboration, collection, session, participant or work
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or missing input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller lacks the participation or permission required
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Duplicate record or illegal state for the operation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Work rejected by a collection's acceptance criteria
    #[error("Criteria not met: {0}")]
    CriteriaNotMet(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for curation operations
pub type CurationResult<T> = Result<T, CurationError>;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
