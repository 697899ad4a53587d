//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired entries out
/// of the store.
///
/// The task sleeps for the configured interval between sweeps and runs
/// until aborted. Each sweep takes the store's structural lock for the
/// duration of the scan; it never contends with an in-flight loader call,
/// which runs under a different lock. The sweep is what bounds memory for
/// keys that are never queried again, since `get`'s lazy expiration check
/// alone would never reclaim those.
///
/// # Arguments
/// * `store` - Shared reference to the cache store
/// * `cleanup_interval` - Time between sweeps
///
/// # Returns
/// A `JoinHandle` for the spawned task; aborting it stops the sweep. The
/// [`Cache`](crate::Cache) handle does this automatically on shutdown and
/// on drop.
pub fn spawn_cleanup_task<K, V>(
    store: Arc<CacheStore<K, V>>,
    cleanup_interval: Duration,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        debug!(interval = ?cleanup_interval, "starting TTL cleanup task");

        loop {
            tokio::time::sleep(cleanup_interval).await;

            let removed = store.cleanup_expired();

            if removed > 0 {
                info!(removed, "TTL cleanup: removed expired entries");
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
