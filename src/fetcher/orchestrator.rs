//! Cache-aside fetch orchestration

use crate::cache::{DocumentCache, cache_key};
use crate::document::Document;
use crate::fetcher::{FetchError, FetchStrategy};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{Instrument, error, info, info_span, warn};

/// Run a strategy behind the document cache
///
/// Unless `refresh` is set, a live cache entry is returned without touching
/// the network. Otherwise the strategy pipeline runs and a successful result
/// is stored under `"{kind}:{url}"` for `ttl`. Cache problems never fail the
/// fetch. `release_resources` runs exactly once after the pipeline, whether
/// it succeeded, failed or panicked.
///
/// # Returns
///
/// The document, or `None` when the pipeline failed
pub async fn cached_fetch(
    strategy: &mut dyn FetchStrategy,
    cache: &dyn DocumentCache,
    ttl: Duration,
    refresh: bool,
) -> Option<Document> {
    let kind = strategy.kind();
    let url = strategy.url().to_string();
    let key = cache_key(kind.cache_name(), &url);
    let span = info_span!("cached_fetch", url = %url, kind = %kind);

    async move {
        if !refresh {
            if let Some(document) = read_cached(cache, &key).await {
                info!("Cache hit for {}", url);
                return Some(document);
            }
        }

        let outcome = AssertUnwindSafe(run_pipeline(strategy))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(FetchError::Panicked(panic_message(panic.as_ref()))));

        strategy.release_resources().await;

        let document = match outcome {
            Ok(document) => document,
            Err(e) => {
                error!(error = %e, "Failed to fetch content for {}: {}", url, e.chain());
                return None;
            }
        };

        match serde_json::to_string(&document) {
            Ok(value) => match cache.set(&key, &value, ttl).await {
                Ok(()) => info!(
                    "{} result for {}",
                    if refresh { "Refreshed" } else { "Cached" },
                    url
                ),
                Err(e) => error!("Failed to cache result for {}: {}", url, e),
            },
            Err(e) => error!("Failed to serialize result for {}: {}", url, e),
        }

        Some(document)
    }
    .instrument(span)
    .await
}

async fn run_pipeline(strategy: &mut dyn FetchStrategy) -> Result<Document, FetchError> {
    strategy.fetch_markup().await?;
    let body = strategy.extract_body().await?;
    let metadata = strategy.extract_metadata().await;
    let page_content = strategy.normalize(&body);

    Ok(Document::new(strategy.url(), page_content, metadata))
}

async fn read_cached(cache: &dyn DocumentCache, key: &str) -> Option<Document> {
    let value = match cache.get(key).await {
        Ok(value) => value?,
        Err(e) => {
            warn!("Cache read failed for {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&value) {
        Ok(document) => Some(document),
        Err(e) => {
            warn!("Discarding undecodable cache entry {}: {}", key, e);
            None
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, MemoryCache};
    use crate::document::{Metadata, WebMetadata};
    use crate::fetcher::StrategyKind;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Calls {
        markup: AtomicUsize,
        release: AtomicUsize,
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Behavior {
        Succeed,
        Fail,
        Panic,
    }

    struct MockStrategy {
        url: String,
        body: String,
        behavior: Behavior,
        calls: Arc<Calls>,
    }

    impl MockStrategy {
        fn new(body: &str, behavior: Behavior, calls: &Arc<Calls>) -> Self {
            Self {
                url: "https://example.com/post".to_string(),
                body: body.to_string(),
                behavior,
                calls: Arc::clone(calls),
            }
        }
    }

    #[async_trait]
    impl FetchStrategy for MockStrategy {
        fn kind(&self) -> StrategyKind {
            StrategyKind::Generic
        }

        fn url(&self) -> &str {
            &self.url
        }

        async fn fetch_markup(&mut self) -> Result<(), FetchError> {
            self.calls.markup.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn extract_body(&mut self) -> Result<String, FetchError> {
            match self.behavior {
                Behavior::Succeed => Ok(format!("<p>{}</p>", self.body)),
                Behavior::Fail => Err(FetchError::Other("boom".to_string())),
                Behavior::Panic => panic!("extractor exploded"),
            }
        }

        async fn extract_metadata(&mut self) -> Metadata {
            Metadata::Web(WebMetadata {
                title: Some("Post".to_string()),
                source: Some(self.url.clone()),
                ..Default::default()
            })
        }

        async fn release_resources(&mut self) {
            self.calls.release.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct BrokenCache;

    #[async_trait]
    impl DocumentCache for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Other("read failed".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Other("write failed".to_string()))
        }
    }

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_cache_round_trip_skips_pipeline() {
        let cache = MemoryCache::new();
        let calls = Arc::new(Calls::default());

        let mut first = MockStrategy::new("hello", Behavior::Succeed, &calls);
        let fetched = cached_fetch(&mut first, &cache, TTL, false).await.unwrap();

        let mut second = MockStrategy::new("changed", Behavior::Succeed, &calls);
        let cached = cached_fetch(&mut second, &cache, TTL, false).await.unwrap();

        assert_eq!(fetched, cached);
        assert_eq!(cached.page_content(), "hello");
        assert_eq!(cached.source(), "https://example.com/post");
        assert_eq!(calls.markup.load(Ordering::SeqCst), 1);
        assert!(
            cache
                .get("GenericFetcher:https://example.com/post")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_refresh_bypasses_and_overwrites() {
        let cache = MemoryCache::new();
        let calls = Arc::new(Calls::default());

        let mut first = MockStrategy::new("old", Behavior::Succeed, &calls);
        cached_fetch(&mut first, &cache, TTL, false).await.unwrap();

        let mut refreshed = MockStrategy::new("new", Behavior::Succeed, &calls);
        let document = cached_fetch(&mut refreshed, &cache, TTL, true).await.unwrap();
        assert_eq!(document.page_content(), "new");

        let mut again = MockStrategy::new("ignored", Behavior::Succeed, &calls);
        let cached = cached_fetch(&mut again, &cache, TTL, false).await.unwrap();
        assert_eq!(cached.page_content(), "new");
        assert_eq!(calls.markup.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_returns_none_and_releases_once() {
        let cache = MemoryCache::new();
        let calls = Arc::new(Calls::default());

        let mut failing = MockStrategy::new("x", Behavior::Fail, &calls);
        assert!(cached_fetch(&mut failing, &cache, TTL, false).await.is_none());

        assert_eq!(calls.release.load(Ordering::SeqCst), 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_panic_returns_none_and_releases_once() {
        let cache = MemoryCache::new();
        let calls = Arc::new(Calls::default());

        let mut panicking = MockStrategy::new("x", Behavior::Panic, &calls);
        assert!(cached_fetch(&mut panicking, &cache, TTL, false).await.is_none());

        assert_eq!(calls.release.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_releases_once() {
        let cache = MemoryCache::new();
        let calls = Arc::new(Calls::default());

        let mut strategy = MockStrategy::new("x", Behavior::Succeed, &calls);
        cached_fetch(&mut strategy, &cache, TTL, false).await.unwrap();

        assert_eq!(calls.release.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_errors_are_swallowed() {
        let calls = Arc::new(Calls::default());

        let mut strategy = MockStrategy::new("still works", Behavior::Succeed, &calls);
        let document = cached_fetch(&mut strategy, &BrokenCache, TTL, false)
            .await
            .unwrap();

        assert_eq!(document.page_content(), "still works");
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache
            .set("GenericFetcher:https://example.com/post", "not json", TTL)
            .await
            .unwrap();
        let calls = Arc::new(Calls::default());

        let mut strategy = MockStrategy::new("fresh", Behavior::Succeed, &calls);
        let document = cached_fetch(&mut strategy, &cache, TTL, false).await.unwrap();

        assert_eq!(document.page_content(), "fresh");
        assert_eq!(calls.markup.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_idempotent_within_ttl() {
        let cache = MemoryCache::new();
        let calls = Arc::new(Calls::default());

        let mut a = MockStrategy::new("same", Behavior::Succeed, &calls);
        let first = cached_fetch(&mut a, &cache, TTL, false).await.unwrap();
        let mut b = MockStrategy::new("same", Behavior::Succeed, &calls);
        let second = cached_fetch(&mut b, &cache, TTL, false).await.unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
