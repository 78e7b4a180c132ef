//! Web search module
//!
//! This module runs search queries against a web search engine, merges the
//! results and fetches the linked pages as documents.

mod aggregator;
mod engine;
mod error;
mod google;

pub use aggregator::{DEFAULT_RESULTS_PER_QUERY, SearchAggregator, dedupe_by_link};
pub use engine::{DateRestriction, SearchEngine, SearchHit, SearchQuery};
pub use error::SearchError;
pub use google::GoogleSearch;
