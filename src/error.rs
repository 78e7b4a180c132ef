//! Error types for the sift crate

use thiserror::Error;

/// Result type for sift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sift operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing or invalid credentials
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Content fetching error
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Document cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Search error
    #[error("Search error: {0}")]
    Search(String),

    /// Answer generation error
    #[error("Answer error: {0}")]
    Answer(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
