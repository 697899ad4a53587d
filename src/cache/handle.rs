//! Cache Handle Module
//!
//! The public entry point: owns the store and the janitor task, and ties
//! the janitor's lifetime to the handle's so a discarded cache leaks no
//! background work.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::store::CacheStore;
use crate::config::CacheConfig;
use crate::error::{BoxError, Result};
use crate::tasks::spawn_cleanup_task;

// == Cache ==
/// A generic, loader-backed, time-bounded in-memory cache.
///
/// Values are recomputed through the caller-supplied loader when missing or
/// stale; concurrent lookups of the same expired key collapse into a single
/// loader call. A background janitor periodically reclaims expired entries
/// so memory stays bounded even for keys that are never queried again.
///
/// Construction spawns the janitor, so a `Cache` must be created inside a
/// tokio runtime. Dropping the handle (or calling [`Cache::shutdown`])
/// stops the janitor.
#[derive(Debug)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    store: Arc<CacheStore<K, V>>,
    janitor: JoinHandle<()>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache with the given default TTL and loader, using the
    /// default cleanup interval (15 minutes).
    ///
    /// # Arguments
    /// * `default_ttl` - TTL applied when a call supplies none
    /// * `loader` - Async function called to populate missing/expired keys
    pub fn new<F, Fut>(default_ttl: Duration, loader: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<V, BoxError>> + Send + 'static,
    {
        Self::with_config(CacheConfig::new(default_ttl), loader)
    }

    /// Creates a cache from an explicit configuration.
    pub fn with_config<F, Fut>(config: CacheConfig, loader: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<V, BoxError>> + Send + 'static,
    {
        let store = Arc::new(CacheStore::new(config.default_ttl, loader));
        let janitor = spawn_cleanup_task(Arc::clone(&store), config.cleanup_interval);

        Self { store, janitor }
    }

    // == Get ==
    /// Retrieves the value for `key`, invoking the loader if the entry is
    /// missing or expired.
    ///
    /// `ttl` overrides the default TTL for any population this call
    /// performs; `None` uses the default. On loader failure the error is
    /// returned as-is and no value is produced; stored state for the key
    /// is left untouched, so the next access retries.
    pub async fn get(&self, key: K, ttl: Option<Duration>) -> Result<V> {
        self.store.get(key, ttl).await
    }

    // == Set ==
    /// Stores `value` for `key` directly, bypassing the loader.
    ///
    /// `Some(Duration::ZERO)` suppresses the write entirely ("do not cache
    /// this"); `None` uses the default TTL.
    pub async fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        self.store.set(key, value, ttl).await;
    }

    // == Length ==
    /// Returns the number of entries currently held, including expired
    /// ones the janitor has not yet reclaimed.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // == Shutdown ==
    /// Stops the background janitor.
    ///
    /// The cache itself remains usable afterwards; only the periodic sweep
    /// stops, so expired entries are no longer reclaimed. Dropping the
    /// handle has the same effect.
    pub fn shutdown(&self) {
        debug!("stopping TTL cleanup task");
        self.janitor.abort();
    }
}

impl<K, V> Drop for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.janitor.abort();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_get_and_set_roundtrip() {
        let cache = Cache::new(Duration::from_secs(60), |key: String| async move {
            Ok(key.len())
        });

        assert_eq!(cache.get("hello".to_string(), None).await.unwrap(), 5);

        cache.set("hello".to_string(), 99, None).await;
        assert_eq!(cache.get("hello".to_string(), None).await.unwrap(), 99);
    }

    #[tokio::test]
    async fn test_shutdown_stops_janitor() {
        let cache: Cache<String, usize> =
            Cache::new(Duration::from_secs(60), |key: String| async move {
                Ok(key.len())
            });

        cache.shutdown();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.janitor.is_finished());
    }

    #[tokio::test]
    async fn test_drop_aborts_janitor() {
        let cache: Cache<String, usize> =
            Cache::new(Duration::from_secs(60), |key: String| async move {
                Ok(key.len())
            });
        let janitor = cache.janitor.abort_handle();

        drop(cache);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(janitor.is_finished());
    }
}
