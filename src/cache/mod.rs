//! # Document Cache Module
//!
//! A keyed store of serialized documents with per-entry expiry. Keys have the
//! form `"{kind}:{url}"` so each fetch strategy owns its own slice of the key
//! space.
//!
//! ## Key Components
//!
//! - `DocumentCache`: async trait shared by all backends
//! - `MemoryCache`: in-process map guarded by a `RwLock`
//! - `CacheDatabase`: persistent libsql table
//!
//! Writers to the same key are last-write-wins. Backends must tolerate
//! concurrent readers and writers from independent fetches.

pub mod database;
pub mod error;
pub mod memory;

use async_trait::async_trait;
use std::time::Duration;

pub use database::CacheDatabase;
pub use error::CacheError;
pub use memory::MemoryCache;

/// A keyed store of serialized documents
#[async_trait]
pub trait DocumentCache: Send + Sync {
    /// Look up a value; expired entries read as absent
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value, replacing any existing entry for the key
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Build the cache key for a strategy kind and URL
pub fn cache_key(kind: &str, url: &str) -> String {
    format!("{}:{}", kind, url)
}
