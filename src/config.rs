//! Configuration Module
//!
//! Construction-time parameters for a cache. There is no environment or
//! file surface; everything is supplied by the constructor caller.

use std::time::Duration;

/// Interval between janitor sweeps when none is configured.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Default TTL used by [`CacheConfig::default`].
const DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Cache Config ==
/// Cache construction parameters.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied to populated values when a call supplies none.
    pub default_ttl: Duration,
    /// Time between background cleanup sweeps.
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a config with the given default TTL and the default cleanup
    /// interval of 15 minutes.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }

    /// Overrides the cleanup interval.
    pub fn with_cleanup_interval(mut self, cleanup_interval: Duration) -> Self {
        self.cleanup_interval = cleanup_interval;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
