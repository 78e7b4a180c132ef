//! # sift - Web Content Extraction for LLM Pipelines
//!
//! This crate turns URLs into normalized, cacheable documents for language
//! model tools. It picks a site-specific extraction strategy per URL, caches
//! results for a day, fans search queries out over a web search engine and
//! fetches the union of their results.
//!
//! ## Features
//!
//! - Site-aware extraction:
//!   - Generic pages via readability and boilerplate heuristics
//!   - YouTube transcripts and metadata
//!   - GitHub notebooks, markdown and code blobs through a headless browser
//!   - namu.wiki articles and Naver blog posts
//! - Cache-aside fetching over an in-memory or libsql cache
//! - Concurrent multi-query search aggregation with link deduplication
//! - Answering tasks from a single document with a rate-limited LLM
//!
//! ## Example
//!
//! ```rust,no_run
//! use sift::cache::MemoryCache;
//! use sift::fetcher::{ContentExtractor, FetchContext, FetcherConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = FetchContext::new(FetcherConfig::default(), Arc::new(MemoryCache::new()))?;
//!     let extractor = ContentExtractor::new(context);
//!
//!     if let Some(document) = extractor.afetch("https://www.rust-lang.org/", false).await {
//!         println!("{}", document.page_content());
//!     }
//!     Ok(())
//! }
//! ```

mod error;
pub mod model;

pub mod answer;
pub mod cache;
pub mod document;
pub mod fetcher;
pub mod markup;
pub mod search;

pub use document::Document;
pub use error::{Error, Result};
pub use fetcher::ContentExtractor;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::document::{Document, Metadata, VideoMetadata, WebMetadata};
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::fetcher::{ContentExtractor, FetchContext, FetcherConfig};
    pub use crate::search::{SearchAggregator, SearchQuery};
}
