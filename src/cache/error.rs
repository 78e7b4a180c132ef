//! Error types for the document cache

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// LibSQL error
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    /// Cached value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<CacheError> for CrateError {
    fn from(err: CacheError) -> Self {
        CrateError::Cache(err.to_string())
    }
}
