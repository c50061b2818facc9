//! Cache Entry Module
//!
//! Defines the structure for individual in-memory cache entries with TTL support.

use std::time::Duration;

use serde_json::Value;

use crate::cache::expiry;

// == Volatile Entry ==
/// A single in-memory cache entry.
#[derive(Debug, Clone)]
pub struct VolatileEntry {
    /// The cached API response body
    pub value: Value,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: i64,
    /// Serialized JSON length, used for memory accounting
    pub size_bytes: usize,
}

impl VolatileEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` after `now`.
    pub fn new(value: Value, ttl: Duration, now: i64) -> Self {
        let size_bytes = value.to_string().len();

        Self {
            value,
            expires_at: expiry::expires_at(now, ttl),
            size_bytes,
        }
    }

    // == Is Expired ==
    /// Checks the entry against the shared expiry predicate.
    pub fn is_expired(&self, now: i64) -> bool {
        expiry::is_expired(self.expires_at, now)
    }
}
