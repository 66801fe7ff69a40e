//! Key-value backends for the customer cache.

use std::future::Future;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;

/// A cache backend operation failed.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be reached or rejected the operation.
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    /// A value could not be encoded for storage.
    #[error("cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String key-value store with per-entry expiry handled by the backend.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CacheError>> + Send;

    fn set(&self, key: String, value: String)
    -> impl Future<Output = Result<(), CacheError>> + Send;

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), CacheError>> + Send;

    /// Drop every entry.
    fn flush(&self) -> impl Future<Output = Result<(), CacheError>> + Send;
}

/// In-process backend on `moka` with a fixed time-to-live.
///
/// Entries expire `ttl` after insertion regardless of reads.
#[derive(Clone)]
pub struct MokaBackend {
    cache: Cache<String, String>,
}

impl MokaBackend {
    /// Create a backend holding at most `max_capacity` entries.
    #[must_use]
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }
}

impl CacheBackend for MokaBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: String, value: String) -> Result<(), CacheError> {
        self.cache.insert(key, value).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn flush(&self) -> Result<(), CacheError> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}
