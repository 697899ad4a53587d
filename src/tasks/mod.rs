//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache handle.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
