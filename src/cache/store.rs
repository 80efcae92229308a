//! Cache Store Module
//!
//! Main cache engine: (category, key) addressed payloads with category-driven TTL
//! and lazy expiry on read.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheCategory, CacheEntry, CacheStats, TtlPolicy};

type EntryKey = (CacheCategory, String);

// == Cache Store ==
/// In-memory response cache keyed by category and identifier.
///
/// Lookups hand out clones of the stored payload, so callers can never mutate
/// what the next reader sees.
#[derive(Debug)]
pub struct CacheStore {
    /// Payload storage
    entries: HashMap<EntryKey, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL per category, applied at write time
    ttl: TtlPolicy,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store using the given TTL policy.
    pub fn new(ttl: TtlPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            ttl,
        }
    }

    // == Set ==
    /// Stores a payload, overwriting any prior entry for the same key.
    ///
    /// Expiration is `now + TTL(category)`.
    pub fn set(&mut self, category: CacheCategory, key: impl Into<String>, value: Value) {
        self.set_at(category, key, value, current_timestamp_ms());
    }

    /// [`CacheStore::set`] against an explicit clock reading.
    pub fn set_at(
        &mut self,
        category: CacheCategory,
        key: impl Into<String>,
        value: Value,
        now_ms: u64,
    ) {
        let key = key.into();
        let ttl = self.ttl.ttl_for(category);
        let entry = CacheEntry::new(category, key.clone(), value, ttl, now_ms);

        debug!("Cache SET: {}:{} (TTL: {}s)", category, key, ttl);
        self.entries.insert((category, key), entry);
        self.stats.record_set();
    }

    // == Get ==
    /// Retrieves a copy of a fresh payload.
    ///
    /// An expired entry counts as a miss and is evicted on the spot.
    pub fn get(&mut self, category: CacheCategory, key: &str) -> Option<Value> {
        self.get_at(category, key, current_timestamp_ms())
    }

    /// [`CacheStore::get`] against an explicit clock reading.
    pub fn get_at(&mut self, category: CacheCategory, key: &str, now_ms: u64) -> Option<Value> {
        let lookup = (category, key.to_string());

        match self.entries.get(&lookup) {
            Some(entry) if !entry.is_expired_at(now_ms) => {
                debug!("Cache HIT: {}:{}", category, key);
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache MISS (expired): {}:{}", category, key);
                self.entries.remove(&lookup);
                self.stats.record_miss();
                None
            }
            None => {
                debug!("Cache MISS: {}:{}", category, key);
                self.stats.record_miss();
                None
            }
        }
    }

    // == Has ==
    /// Returns true if a fresh entry exists. Does not touch the counters.
    pub fn has(&self, category: CacheCategory, key: &str) -> bool {
        self.entries
            .get(&(category, key.to_string()))
            .is_some_and(|entry| !entry.is_expired())
    }

    // == TTL Remaining ==
    /// Remaining lifetime in seconds of a fresh entry.
    pub fn ttl_remaining(&self, category: CacheCategory, key: &str) -> Option<u64> {
        let now = current_timestamp_ms();
        self.entries
            .get(&(category, key.to_string()))
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.ttl_remaining_ms_at(now) / 1000)
    }

    // == Delete ==
    /// Removes an entry, returning how many were removed (0 or 1).
    pub fn delete(&mut self, category: CacheCategory, key: &str) -> usize {
        match self.entries.remove(&(category, key.to_string())) {
            Some(_) => {
                debug!("Cache DELETE: {}:{}", category, key);
                1
            }
            None => 0,
        }
    }

    // == Delete By Category ==
    /// Removes every entry of a category, returning the count removed.
    pub fn delete_by_category(&mut self, category: CacheCategory) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(c, _), _| *c != category);
        let removed = before - self.entries.len();

        if removed > 0 {
            info!("Cache DELETE CATEGORY: {} ({} entries)", category, removed);
        }
        removed
    }

    // == Flush ==
    /// Removes all entries. Counters are kept.
    pub fn flush(&mut self) {
        self.entries.clear();
        info!("Cache FLUSH: all entries cleared");
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();

        let mut keys: Vec<String> = self
            .entries
            .keys()
            .map(|(category, key)| format!("{}:{}", category, key))
            .collect();
        keys.sort();
        stats.keys = keys;

        stats
    }

    // == TTL Policy ==
    /// Changes a category's TTL. Existing entries keep their expiration.
    pub fn set_category_ttl(&mut self, category: CacheCategory, seconds: u64) {
        self.ttl.set_ttl(category, seconds);
    }

    pub fn ttl_policy(&self) -> &TtlPolicy {
        &self.ttl
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(current_timestamp_ms())
    }

    /// [`CacheStore::cleanup_expired`] against an explicit clock reading.
    pub fn cleanup_expired_at(&mut self, now_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now_ms));
        before - self.entries.len()
    }

    // == Length ==
    /// Returns the current number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(TtlPolicy::default())
    }
}
