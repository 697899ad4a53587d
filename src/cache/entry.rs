//! Cache Entry Module
//!
//! Defines the structure for individual cache entries: the cached value, an
//! atomically readable expiration timestamp, and the per-key lock that
//! serializes population of a single key.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use tokio::sync::{RwLock, RwLockWriteGuard};

// == Monotonic Clock ==
/// Anchor for the process-local monotonic clock.
///
/// Expiration timestamps are nanoseconds elapsed since this anchor, so they
/// fit in an `AtomicU64` and are immune to wall-clock adjustments. The
/// anchor is taken lazily on first use; timestamp 0 always lies in the past
/// (or at the present instant), which makes 0 a natural "already expired"
/// marker for freshly created entries.
static CLOCK_ANCHOR: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Returns the current monotonic clock reading in nanoseconds.
pub(crate) fn now_nanos() -> u64 {
    CLOCK_ANCHOR.elapsed().as_nanos() as u64
}

/// Computes the expiration timestamp for a value cached at `now` with the
/// given TTL.
///
/// The addition saturates, so a huge TTL (e.g. `Duration::MAX`) yields
/// `u64::MAX` and behaves as "effectively never expires". A zero TTL yields
/// `now` itself, which is already outside the freshness window (freshness
/// requires `expires_at > now`), so the value expires on the next access.
pub(crate) fn ttl_to_deadline(now: u64, ttl: Duration) -> u64 {
    let ttl_nanos = u64::try_from(ttl.as_nanos()).unwrap_or(u64::MAX);
    now.saturating_add(ttl_nanos)
}

// == Cache Entry ==
/// A single cache entry: one value slot plus its expiration timestamp.
///
/// The two fields are deliberately guarded differently:
/// - `expires_at` is an atomic so the hot path can check freshness without
///   taking any lock.
/// - `slot` is an async `RwLock`; its write half is the per-key lock held
///   for the whole duration of a loader call, which is what collapses
///   concurrent loads for the same key into a single flight.
///
/// Invariant: `expires_at` is only ever stored while the slot's write lock
/// is held, and always *after* the value write. A reader that observes a
/// future `expires_at` is therefore guaranteed the slot holds the value
/// that timestamp was written for.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
    /// Expiration timestamp in monotonic nanoseconds; 0 = already expired.
    expires_at: AtomicU64,
    /// The stored value; `None` only before the first successful write.
    slot: RwLock<Option<V>>,
}

impl<V: Clone> CacheEntry<V> {
    // == Constructor ==
    /// Creates an empty entry that is already expired, so the first `get`
    /// falls through to the loader.
    pub(crate) fn new() -> Self {
        Self {
            expires_at: AtomicU64::new(0),
            slot: RwLock::new(None),
        }
    }

    /// Atomically reads the expiration timestamp.
    pub(crate) fn expires_at(&self) -> u64 {
        self.expires_at.load(Ordering::Acquire)
    }

    /// Returns true if the entry is fresh at `now` (strictly before its
    /// expiration).
    pub(crate) fn is_fresh(&self, now: u64) -> bool {
        self.expires_at() > now
    }

    /// Returns true if the janitor may reclaim the entry at `now`.
    ///
    /// Boundary condition: an entry whose expiration equals `now` is no
    /// longer fresh but is not yet reclaimed; only a strictly-past
    /// expiration is swept.
    pub(crate) fn is_expired(&self, now: u64) -> bool {
        self.expires_at() < now
    }

    // == Fast Path Read ==
    /// Returns a clone of the value if the entry is fresh at `now`.
    ///
    /// Takes only the shared read half of the slot lock, so concurrent
    /// fresh reads of the same key never serialize each other. Returns
    /// `None` when the entry is stale; the caller must then go through
    /// [`CacheEntry::lock`].
    pub(crate) async fn fresh_value(&self, now: u64) -> Option<V> {
        if !self.is_fresh(now) {
            return None;
        }
        self.slot.read().await.clone()
    }

    // == Per-Key Lock ==
    /// Acquires the per-key exclusive lock.
    ///
    /// Held across the loader call by design: every other caller for the
    /// same key parks here until the in-flight load finishes, then observes
    /// the freshly written value on its re-check.
    pub(crate) async fn lock(&self) -> RwLockWriteGuard<'_, Option<V>> {
        self.slot.write().await
    }

    // == Guarded Write ==
    /// Writes the value and its expiration together.
    ///
    /// The caller must hold the write guard obtained from
    /// [`CacheEntry::lock`]; passing the guarded slot by mutable reference
    /// keeps the value write and the timestamp store inside the critical
    /// section, value first.
    pub(crate) fn store(&self, slot: &mut Option<V>, value: V, deadline: u64) {
        *slot = Some(value);
        self.expires_at.store(deadline, Ordering::Release);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_is_expired() {
        let entry: CacheEntry<i32> = CacheEntry::new();
        let now = now_nanos();

        assert!(!entry.is_fresh(now));
        assert_eq!(entry.expires_at(), 0);
    }

    #[tokio::test]
    async fn test_store_makes_entry_fresh() {
        let entry = CacheEntry::new();
        let now = now_nanos();

        let mut slot = entry.lock().await;
        entry.store(&mut slot, 42, ttl_to_deadline(now, Duration::from_secs(60)));
        drop(slot);

        assert!(entry.is_fresh(now_nanos()));
        assert_eq!(entry.fresh_value(now_nanos()).await, Some(42));
    }

    #[tokio::test]
    async fn test_stale_entry_yields_no_fast_path_value() {
        let entry = CacheEntry::new();
        let now = now_nanos();

        let mut slot = entry.lock().await;
        entry.store(&mut slot, 7, ttl_to_deadline(now, Duration::ZERO));
        drop(slot);

        // Zero TTL: the deadline equals the write time, so the entry is
        // immediately outside the freshness window.
        assert_eq!(entry.fresh_value(now_nanos()).await, None);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry: CacheEntry<i32> = CacheEntry::new();
        let now = 1_000_000;
        entry.expires_at.store(now, Ordering::Release);

        // expires_at == now: no longer fresh, not yet swept.
        assert!(!entry.is_fresh(now));
        assert!(!entry.is_expired(now));
        assert!(entry.is_expired(now + 1));
    }

    #[test]
    fn test_deadline_saturates_for_huge_ttl() {
        assert_eq!(ttl_to_deadline(12345, Duration::MAX), u64::MAX);
        assert_eq!(ttl_to_deadline(u64::MAX - 1, Duration::from_secs(1)), u64::MAX);
    }

    #[test]
    fn test_deadline_zero_ttl_is_now() {
        assert_eq!(ttl_to_deadline(500, Duration::ZERO), 500);
    }

    #[test]
    fn test_now_nanos_is_monotonic() {
        let a = now_nanos();
        let b = now_nanos();
        assert!(b >= a);
    }
}
