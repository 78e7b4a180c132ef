//! The content extraction facade

use crate::document::Document;
use crate::fetcher::{FetchContext, FetchStrategy, cached_fetch, select};
use futures::future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

/// Entry point for turning URLs into documents
///
/// Cheap to clone; all clones share one [`FetchContext`].
#[derive(Clone)]
pub struct ContentExtractor {
    context: Arc<FetchContext>,
}

impl ContentExtractor {
    /// Create an extractor owning `context`
    pub fn new(context: FetchContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    /// Shared fetch context
    pub fn context(&self) -> &FetchContext {
        &self.context
    }

    /// Build the strategy the selector picks for `url`
    pub fn strategy_for(&self, url: &str) -> Box<dyn FetchStrategy> {
        let kind = select(url);
        debug!("Selected {} for {}", kind, url);
        kind.build(url, &self.context)
    }

    /// Fetch one URL through the cache
    ///
    /// # Returns
    ///
    /// The document, or `None` if it could not be fetched
    #[instrument(skip(self))]
    pub async fn afetch(&self, url: &str, refresh: bool) -> Option<Document> {
        let mut strategy = self.strategy_for(url);
        cached_fetch(
            strategy.as_mut(),
            self.context.cache.as_ref(),
            self.context.config.cache_ttl,
            refresh,
        )
        .await
    }

    /// Fetch many URLs concurrently, keeping only the successes
    ///
    /// At most `max_concurrent_fetches` run at once, capped at the semaphore's
    /// permit limit. Result order is not meaningful.
    #[instrument(skip(self, urls), fields(count = urls.len()))]
    pub async fn afetch_all(&self, urls: &[String], refresh: bool) -> Vec<Document> {
        let permits = self
            .context
            .config
            .max_concurrent_fetches
            .clamp(1, Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));

        let tasks = urls.iter().map(|url| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        warn!("Fetch of {} skipped: {}", url, e);
                        return None;
                    }
                };
                self.afetch(url, refresh).await
            }
        });

        let documents: Vec<Document> = future::join_all(tasks).await.into_iter().flatten().collect();
        info!("Fetched {} of {} URLs", documents.len(), urls.len());
        documents
    }
}
