//! Error types for the cache
//!
//! Provides unified error handling using thiserror.
//!
//! The cache has no internal failure modes of its own (no I/O, no parsing);
//! the only thing that can go wrong is the caller-supplied loader, so the
//! error type exists to carry loader failures back to `get` callers
//! untouched.

use thiserror::Error;

// == Boxed Error Alias ==
/// The error type produced by loader functions.
///
/// Loaders can fail for arbitrary domain-specific reasons (network errors,
/// parse errors, ...), so the boundary accepts any boxed error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The loader failed to produce a value for a key.
    ///
    /// The underlying error is passed through as-is; the cache never
    /// retries, suppresses, or rewraps it. Stored state for the key is left
    /// exactly as it was before the failed load, so the next `get` on a
    /// still-expired entry will invoke the loader again.
    #[error(transparent)]
    Loader(#[from] BoxError),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
