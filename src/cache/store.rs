//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with per-key single-flight
//! loading and TTL expiration.
//!
//! Two levels of locking, deliberately kept separate:
//! - a structural mutex around the map, held only to locate-or-create an
//!   entry and during the cleanup scan;
//! - a per-entry lock (inside [`CacheEntry`]) held across the loader call.
//!
//! The structural lock is never held while the loader runs, so a slow load
//! of one key never blocks access to unrelated keys.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::cache::entry::{now_nanos, ttl_to_deadline, CacheEntry};
use crate::error::{BoxError, Result};

// == Loader Types ==
/// The future returned by a loader invocation.
pub type LoaderFuture<V> = Pin<Box<dyn Future<Output = std::result::Result<V, BoxError>> + Send>>;

/// The caller-supplied function that produces a value for a missing or
/// expired key. The sole source of truth for cache population.
pub type Loader<K, V> = Arc<dyn Fn(K) -> LoaderFuture<V> + Send + Sync>;

// == Cache Store ==
/// Main cache storage with TTL expiration and loader-backed population.
///
/// The store owns all entries; entries are created lazily on first access
/// to a key and removed only by the periodic cleanup sweep, never
/// synchronously by `get` or `set`.
pub struct CacheStore<K, V> {
    /// Key-to-entry map, guarded by the structural lock.
    entries: Mutex<HashMap<K, Arc<CacheEntry<V>>>>,
    /// TTL applied when a call does not override it.
    default_ttl: Duration,
    /// Invoked to (re)compute the value for a missing or expired key.
    loader: Loader<K, V>,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a new store with the given default TTL and loader.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL used when `get`/`set` receive no per-call TTL
    /// * `loader` - Async function called on cache misses and expirations
    pub fn new<F, Fut>(default_ttl: Duration, loader: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<V, BoxError>> + Send + 'static,
    {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            loader: Arc::new(move |key| Box::pin(loader(key))),
        }
    }

    // == Locate Or Create ==
    /// Returns the entry for `key`, creating an empty (already expired) one
    /// if absent.
    ///
    /// This is the single synchronization point guaranteeing exactly one
    /// entry object per key, which is what the per-key lock's single-flight
    /// guarantee rests on. The structural lock is held only for the map
    /// lookup or insert.
    fn entry(&self, key: &K) -> Arc<CacheEntry<V>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get(key) {
            return Arc::clone(entry);
        }

        let entry = Arc::new(CacheEntry::new());
        entries.insert(key.clone(), Arc::clone(&entry));
        entry
    }

    // == Get ==
    /// Retrieves the value for `key`, invoking the loader if the entry is
    /// missing or expired.
    ///
    /// Double-checked expiration:
    /// 1. Fast path: if the atomically read expiration is still in the
    ///    future, return the cached value without the per-key lock.
    /// 2. Slow path: take the per-key lock and re-check, since another
    ///    caller may have finished populating while this one waited.
    /// 3. Still stale: invoke the loader. On success, write the value and
    ///    `now + ttl` together under the lock; on failure, leave the entry
    ///    untouched and return the loader's error, so the next access
    ///    retries.
    ///
    /// At most one loader call is in flight per key at any time; concurrent
    /// callers for the same key park on the per-key lock and then observe
    /// the freshly written value.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    /// * `ttl` - Per-call TTL override for any population this call
    ///   performs; `None` uses the store default. `Some(Duration::ZERO)`
    ///   makes a freshly loaded value expire on the next access.
    pub async fn get(&self, key: K, ttl: Option<Duration>) -> Result<V> {
        let entry = self.entry(&key);

        if let Some(value) = entry.fresh_value(now_nanos()).await {
            return Ok(value);
        }

        let mut slot = entry.lock().await;

        // Re-check under the lock: a caller that was parked here while
        // another one ran the loader must not trigger a redundant load.
        if entry.is_fresh(now_nanos()) {
            if let Some(value) = slot.clone() {
                return Ok(value);
            }
        }

        match (self.loader)(key).await {
            Ok(value) => {
                let deadline =
                    ttl_to_deadline(now_nanos(), ttl.unwrap_or(self.default_ttl));
                entry.store(&mut slot, value.clone(), deadline);
                Ok(value)
            }
            Err(err) => {
                // Neither the value nor the expiration moves: the entry
                // stays expired and the next access retries the loader.
                debug!("loader failed, entry left unchanged");
                Err(err.into())
            }
        }
    }

    // == Set ==
    /// Stores `value` for `key` directly, bypassing the loader.
    ///
    /// An explicit TTL of exactly zero suppresses the write entirely; it is
    /// a sentinel for "do not cache this". Otherwise the value and its
    /// expiration are written together under the per-key lock.
    ///
    /// # Arguments
    /// * `key` - The key to store under
    /// * `value` - The value to store
    /// * `ttl` - Per-call TTL; `None` uses the store default
    pub async fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        if ttl == Some(Duration::ZERO) {
            return;
        }

        let entry = self.entry(&key);
        let mut slot = entry.lock().await;
        let deadline = ttl_to_deadline(now_nanos(), ttl.unwrap_or(self.default_ttl));
        entry.store(&mut slot, value, deadline);
    }

    // == Cleanup Expired ==
    /// Removes every entry whose expiration lies strictly in the past.
    ///
    /// Holds the structural lock for the full scan; `get`/`set` calls on
    /// any key may block briefly on entry creation during the scan, but an
    /// in-flight loader call is never blocked (different lock). An entry
    /// removed here while a load for it is still in flight simply becomes
    /// detached: the loading caller still gets its value, and the next
    /// access creates a fresh entry.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = now_nanos();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    // == Length ==
    /// Returns the current number of entries in the store, including
    /// expired ones the janitor has not yet reclaimed.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> std::fmt::Debug for CacheStore<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}
