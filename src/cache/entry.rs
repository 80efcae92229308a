//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with category-driven expiry.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

use crate::cache::CacheCategory;

// == Cache Entry ==
/// A cached upstream payload with its expiration.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Category the payload belongs to
    pub category: CacheCategory,
    /// Identifier within the category
    pub key: String,
    /// The unwrapped upstream payload
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry written at `now_ms` that lives for `ttl_seconds`.
    pub fn new(
        category: CacheCategory,
        key: String,
        value: Value,
        ttl_seconds: u64,
        now_ms: u64,
    ) -> Self {
        Self {
            category,
            key,
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_seconds.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry is expired once the current time reaches `expires_at`, so a
    /// read exactly at the boundary already misses.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    /// Checks if the entry has expired against the wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds at `now_ms`, zero once expired.
    pub fn ttl_remaining_ms_at(&self, now_ms: u64) -> u64 {
        self.expires_at.saturating_sub(now_ms)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
