//! Error types for the fetcher module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for fetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP status {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Headless browser error
    #[error("Browser error: {0}")]
    Browser(String),

    /// Transcript retrieval error
    #[error("Transcript error: {0}")]
    Transcript(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Blocking worker failed to join
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// A pipeline step panicked
    #[error("Fetch panicked: {0}")]
    Panicked(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Render the error followed by its source chain
    pub fn chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            rendered.push_str(": ");
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        rendered
    }
}

impl From<FetchError> for CrateError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Http(e) => CrateError::Http(e),
            _ => CrateError::Fetch(err.to_string()),
        }
    }
}
