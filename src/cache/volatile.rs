//! Volatile Cache Module
//!
//! Per-process in-memory TTL cache. Expired entries are dropped lazily on read
//! and proactively by the periodic sweep. Capacity is unbounded unless a
//! `max_entries` limit is configured, in which case LRU eviction applies.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{expiry, CacheMetrics, LruTracker, MetricsReport, VolatileEntry};

// == Volatile Cache ==
/// In-memory key/value store with per-entry TTL.
#[derive(Debug)]
pub struct VolatileCache {
    /// Name used in logs and reports, e.g. "tmdb-search"
    name: String,
    /// Disabled caches miss on every lookup and ignore writes
    enabled: bool,
    entries: HashMap<String, VolatileEntry>,
    /// Only maintained when a capacity bound is set
    lru: LruTracker,
    max_entries: Option<usize>,
    metrics: CacheMetrics,
    /// Sum of `size_bytes` over stored entries
    calculated_size: usize,
}

impl VolatileCache {
    // == Constructor ==
    /// Creates an enabled, unbounded cache.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            entries: HashMap::new(),
            lru: LruTracker::new(),
            max_entries: None,
            metrics: CacheMetrics::new(),
            calculated_size: 0,
        }
    }

    /// Bounds the cache to `max_entries`, evicting least recently used keys.
    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries.filter(|n| *n > 0);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    // == Get ==
    /// Returns the value if present and not expired.
    ///
    /// An expired entry is removed on the spot and counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        if !self.enabled {
            self.metrics.record_miss();
            return None;
        }

        let now = expiry::now_ms();
        match self.entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                self.remove_entry(key);
                self.metrics.record_miss();
                None
            }
            Some(entry) => {
                let value = entry.value.clone();
                self.metrics.record_hit();
                if self.max_entries.is_some() {
                    self.lru.touch(key);
                }
                Some(value)
            }
            None => {
                self.metrics.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Inserts or replaces `key`, expiring `ttl` from now.
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Duration) {
        if !self.enabled {
            return;
        }

        let key = key.into();
        let entry = VolatileEntry::new(value, ttl, expiry::now_ms());

        if let Some(max_entries) = self.max_entries {
            if !self.entries.contains_key(&key) {
                while self.entries.len() >= max_entries {
                    let Some(oldest) = self.lru.evict_oldest() else {
                        break;
                    };
                    self.remove_entry(&oldest);
                    self.metrics.record_eviction();
                    debug!(cache = %self.name, key = %oldest, "Evicted least recently used entry");
                }
            }
            self.lru.touch(&key);
        }

        self.calculated_size += entry.size_bytes;
        if let Some(previous) = self.entries.insert(key, entry) {
            self.calculated_size -= previous.size_bytes;
        }
        self.metrics.record_set();
    }

    // == Clear ==
    /// Removes a single key; no-op if absent.
    pub fn clear(&mut self, key: &str) {
        self.remove_entry(key);
    }

    /// Removes every entry. Metrics are kept.
    pub fn clear_all(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.calculated_size = 0;
        info!(cache = %self.name, "Cache cleared");
    }

    // == Cleanup ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup(&mut self) -> usize {
        let now = expiry::now_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }
        expired.len()
    }

    // == Size ==
    /// Physical entry count; may include expired entries not yet swept.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    pub fn calculated_size(&self) -> usize {
        self.calculated_size
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
        info!(cache = %self.name, "Metrics reset");
    }

    /// Serializable snapshot of counters and occupancy.
    pub fn report(&self) -> MetricsReport {
        MetricsReport::new(
            &self.name,
            self.enabled,
            &self.metrics,
            self.entries.len(),
            self.calculated_size,
            self.max_entries,
        )
    }

    fn remove_entry(&mut self, key: &str) {
        if let Some(entry) = self.entries.remove(key) {
            self.calculated_size -= entry.size_bytes;
            self.lru.remove(key);
        }
    }
}
