//! Persistent document cache backed by libsql

use crate::cache::{CacheError, DocumentCache};
use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, params};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Document cache stored in a local libsql database
#[derive(Clone)]
pub struct CacheDatabase {
    conn: Connection,
}

impl CacheDatabase {
    /// Wrap an open connection, creating the cache table if needed
    #[instrument(skip(conn))]
    pub async fn new(conn: Connection) -> Result<Self, CacheError> {
        initialize_schema(&conn).await?;
        Ok(Self { conn })
    }

    /// Open (or create) the database file at `path`
    pub async fn new_from_path(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CacheError::Other(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let db = libsql::Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        Self::new(conn).await
    }

    /// Delete expired rows, returning how many were removed
    #[instrument(skip(self))]
    pub async fn purge_expired(&self) -> Result<u64, CacheError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM web_cache WHERE expires_at <= ?",
                params![Utc::now().timestamp_millis()],
            )
            .await?;
        debug!("Purged {} expired cache rows", removed);
        Ok(removed)
    }
}

async fn initialize_schema(conn: &Connection) -> Result<(), CacheError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS web_cache (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            expires_at INTEGER NOT NULL
        )",
        params![],
    )
    .await?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_web_cache_expires_at ON web_cache(expires_at)",
        params![],
    )
    .await?;

    Ok(())
}

#[async_trait]
impl DocumentCache for CacheDatabase {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut rows = self
            .conn
            .query(
                "SELECT value FROM web_cache WHERE key = ? AND expires_at > ?",
                params![key, Utc::now().timestamp_millis()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let ttl_ms = i64::try_from(ttl.as_millis())
            .map_err(|_| CacheError::Other(format!("TTL out of range: {:?}", ttl)))?;
        let expires_at = Utc::now().timestamp_millis().saturating_add(ttl_ms);

        self.conn
            .execute(
                "INSERT INTO web_cache (key, value, expires_at) VALUES (?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 expires_at = excluded.expires_at",
                params![key, value, expires_at],
            )
            .await?;
        Ok(())
    }
}
