//! Loadcache - a generic in-memory cache with TTL and single-flight loading
//!
//! Stores key-value pairs with per-value expiration and transparently
//! recomputes a value through a caller-supplied async loader when it is
//! missing or stale. Concurrent lookups of the same expired key collapse
//! into a single loader call; a background janitor reclaims expired entries
//! so memory stays bounded.
//!
//! Intended for repeated lookups that are expensive to compute (network
//! calls, heavy computation) where bounded staleness is acceptable.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use loadcache::Cache;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache = Cache::new(Duration::from_secs(300), |key: String| async move {
//!     // Called on cache misses and expirations.
//!     Ok::<_, loadcache::BoxError>(key.len())
//! });
//!
//! // First access invokes the loader; later accesses within the TTL do not.
//! let value = cache.get("hello".to_string(), None).await.unwrap();
//! assert_eq!(value, 5);
//!
//! // Direct writes bypass the loader; per-call TTLs override the default.
//! cache.set("count".to_string(), 42, Some(Duration::from_secs(10))).await;
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStore, Loader, LoaderFuture};
pub use config::CacheConfig;
pub use error::{BoxError, CacheError, Result};
pub use tasks::spawn_cleanup_task;
