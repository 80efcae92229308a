//! Cache Module
//!
//! Provides the in-memory response cache with per-category TTL and lazy expiry.

mod category;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use category::{CacheCategory, TtlPolicy};
pub use entry::{current_timestamp_ms, CacheEntry};
pub use stats::CacheStats;
pub use store::CacheStore;
