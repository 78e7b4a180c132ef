//! Multi-query search aggregation

use crate::document::Document;
use crate::fetcher::ContentExtractor;
use crate::search::{SearchEngine, SearchHit, SearchQuery};
use futures::future;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Results requested from the engine for each query
pub const DEFAULT_RESULTS_PER_QUERY: usize = 3;

/// Runs several queries and fetches the union of their results
#[derive(Clone)]
pub struct SearchAggregator {
    engine: Arc<dyn SearchEngine>,
    extractor: ContentExtractor,
    max_results_per_query: usize,
}

impl SearchAggregator {
    /// Create an aggregator over `engine`, fetching through `extractor`
    pub fn new(engine: Arc<dyn SearchEngine>, extractor: ContentExtractor) -> Self {
        Self {
            engine,
            extractor,
            max_results_per_query: DEFAULT_RESULTS_PER_QUERY,
        }
    }

    /// Set how many results each query asks for
    pub fn with_max_results(mut self, max_results_per_query: usize) -> Self {
        self.max_results_per_query = max_results_per_query;
        self
    }

    /// Run all queries concurrently and return the deduplicated hits
    ///
    /// A query that errors is logged and contributes nothing.
    #[instrument(skip(self, queries), fields(queries = queries.len()))]
    pub async fn search_results(&self, queries: &[SearchQuery]) -> Vec<SearchHit> {
        let tasks = queries.iter().map(|query| async move {
            match self
                .engine
                .search(
                    &query.query,
                    self.max_results_per_query,
                    query.date_restriction(),
                )
                .await
            {
                Ok(hits) => hits,
                Err(e) => {
                    warn!("Search failed for {:?}: {}", query.query, e);
                    Vec::new()
                }
            }
        });

        let hits = future::join_all(tasks).await.into_iter().flatten();
        dedupe_by_link(hits)
    }

    /// Search, then fetch every distinct result link
    ///
    /// Links that fail to fetch are left out; the result may be empty.
    #[instrument(skip(self, queries), fields(queries = queries.len()))]
    pub async fn aggregate(&self, queries: &[SearchQuery]) -> Vec<Document> {
        let links = self
            .search_results(queries)
            .await
            .into_iter()
            .map(|hit| hit.link)
            .collect::<Vec<_>>();

        let documents = self.extractor.afetch_all(&links, false).await;
        info!(
            "Aggregated {} documents from {} links",
            documents.len(),
            links.len()
        );
        documents
    }
}

/// Drop hits without a link and keep one hit per link, the last one seen
///
/// The order of the returned hits is unspecified.
pub fn dedupe_by_link(hits: impl IntoIterator<Item = SearchHit>) -> Vec<SearchHit> {
    let mut by_link = HashMap::new();
    for hit in hits {
        if hit.link.trim().is_empty() {
            continue;
        }
        by_link.insert(hit.link.clone(), hit);
    }
    by_link.into_values().collect()
}
