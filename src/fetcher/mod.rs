//! Web content fetcher module
//!
//! This module turns a URL into a normalized [`Document`]. A pure selector
//! maps the URL to a [`StrategyKind`]; the strategy built from that kind
//! retrieves the page (plain HTTP or a headless browser), locates the
//! content-bearing markup, extracts metadata and normalizes the body. The
//! [`cached_fetch`] orchestrator wraps that pipeline with a cache-aside
//! policy, and [`ContentExtractor`] is the single entry point callers use.

mod blog;
mod browser;
mod config;
mod error;
mod extractor;
mod generic;
mod github;
mod metadata;
mod orchestrator;
mod selector;
mod transcript;
mod wiki;
mod youtube;

pub use blog::BlogFetcher;
pub use browser::BrowserSession;
pub use config::{BrowserConfig, DEFAULT_CACHE_TTL, FetcherConfig, FetcherConfigBuilder};
pub use error::FetchError;
pub use extractor::ContentExtractor;
pub use generic::GenericFetcher;
pub use github::{GithubBlob, GithubFetcher};
pub use metadata::{extract_web_metadata, find_published_date};
pub use orchestrator::cached_fetch;
pub use selector::{StrategyKind, mobile_blog_url, select};
pub use transcript::{TimedTextClient, TranscriptSource, TranscriptSegment};
pub use wiki::WikiFetcher;
pub use youtube::{YoutubeFetcher, video_id};

use crate::cache::DocumentCache;
use crate::document::Metadata;
use crate::markup::{MarkdownOptions, html_to_markdown};
use async_trait::async_trait;
use std::sync::Arc;

/// One way of turning a URL into document parts
///
/// The orchestrator drives the steps in a fixed order: `fetch_markup`,
/// `extract_body`, `extract_metadata`, `normalize`, and finally
/// `release_resources`, which runs whether or not the earlier steps failed.
#[async_trait]
pub trait FetchStrategy: Send {
    /// The variant tag, used for the cache key
    fn kind(&self) -> StrategyKind;

    /// The URL this strategy retrieves, which becomes the document source
    fn url(&self) -> &str;

    /// Retrieve raw markup or platform source
    async fn fetch_markup(&mut self) -> Result<(), FetchError>;

    /// Locate the content-bearing markup; a missing block yields an empty string
    async fn extract_body(&mut self) -> Result<String, FetchError>;

    /// Convert the extracted body into the document text
    fn normalize(&self, body: &str) -> String {
        html_to_markdown(body, MarkdownOptions::default())
    }

    /// Extract variant metadata; never fails, errors degrade to a marker
    async fn extract_metadata(&mut self) -> Metadata;

    /// Tear down transient state such as browser sessions
    async fn release_resources(&mut self) {}
}

/// Shared handles every strategy needs, built once at startup
pub struct FetchContext {
    /// HTTP client for plain page and transcript requests
    pub http: reqwest::Client,

    /// Document cache
    pub cache: Arc<dyn DocumentCache>,

    /// Fetcher configuration
    pub config: FetcherConfig,

    /// Video transcript provider
    pub transcripts: Arc<dyn TranscriptSource>,
}

impl FetchContext {
    /// Build a context with an HTTP client and timed-text transcripts
    pub fn new(config: FetcherConfig, cache: Arc<dyn DocumentCache>) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()?;

        let transcripts = Arc::new(TimedTextClient::new(http.clone()));

        Ok(Self {
            http,
            cache,
            config,
            transcripts,
        })
    }

    /// Replace the transcript provider
    pub fn with_transcript_source(mut self, transcripts: Arc<dyn TranscriptSource>) -> Self {
        self.transcripts = transcripts;
        self
    }
}
