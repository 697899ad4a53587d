//! Cache Module
//!
//! Provides the loader-backed in-memory cache: entry and store internals
//! plus the public `Cache` handle.

mod entry;
mod handle;
mod store;


// Re-export public types
pub use handle::Cache;
pub use store::{CacheStore, Loader, LoaderFuture};
