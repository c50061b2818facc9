//! Cache Metrics Module
//!
//! Tracks in-memory cache performance: hits, misses, sets, and evictions.

use serde::Serialize;

// == Cache Metrics ==
/// Counters for one in-memory cache.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of failed lookups (absent, expired, or cache disabled)
    pub misses: u64,
    /// Number of stored entries
    pub sets: u64,
    /// Number of entries evicted by the capacity bound
    pub evictions: u64,
}

impl CacheMetrics {
    // == Constructor ==
    /// Creates a new CacheMetrics with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Reset ==
    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// == Metrics Report ==
/// Serializable snapshot of one in-memory cache.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub name: String,
    pub enabled: bool,
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub evictions: u64,
    /// Rounded to two decimals
    pub hit_rate: f64,
    pub hit_rate_percent: u32,
    /// Physical entry count, including not-yet-swept expired entries
    pub size: usize,
    /// Approximate payload bytes held
    pub calculated_size: usize,
    pub max_entries: Option<usize>,
    pub memory_usage_mb: f64,
}

impl MetricsReport {
    pub fn new(
        name: &str,
        enabled: bool,
        metrics: &CacheMetrics,
        size: usize,
        calculated_size: usize,
        max_entries: Option<usize>,
    ) -> Self {
        let hit_rate = metrics.hit_rate();

        Self {
            name: name.to_string(),
            enabled,
            hits: metrics.hits,
            misses: metrics.misses,
            sets: metrics.sets,
            evictions: metrics.evictions,
            hit_rate: round2(hit_rate),
            hit_rate_percent: (hit_rate * 100.0).round() as u32,
            size,
            calculated_size,
            max_entries,
            memory_usage_mb: bytes_to_mb(calculated_size as u64),
        }
    }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts a byte count to megabytes rounded to two decimals.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    round2(bytes as f64 / (1024.0 * 1024.0))
}
