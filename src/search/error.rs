//! # Search Error Types Module
//!
//! Errors raised by web search engines. The aggregator logs these and treats
//! the failing query as contributing no results.

use crate::error::Error as CrateError;
use thiserror::Error;

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine throttled the request
    #[error("Rate limited by search engine")]
    RateLimited,

    /// Non-success response from the engine
    #[error("Search API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Response body could not be decoded
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid search parameters
    #[error("Invalid search parameters: {0}")]
    InvalidParameters(String),
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::UnexpectedResponse(err.to_string())
    }
}

impl From<SearchError> for CrateError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Http(e) => CrateError::Http(e),
            _ => CrateError::Search(err.to_string()),
        }
    }
}
