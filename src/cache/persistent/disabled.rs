use std::time::Duration;

use serde_json::Value;

use super::{PersistentStats, PersistentStore, StoredEntry};

/// Persistent store that stores nothing.
///
/// Stands in for [`super::SqliteCache`] when persistence is disabled, so
/// callers never branch on an `enabled` flag.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCache;

impl DisabledCache {
    pub fn new() -> Self {
        Self
    }
}

impl PersistentStore for DisabledCache {
    fn is_enabled(&self) -> bool {
        false
    }

    fn lookup(&self, _key: &str) -> Option<StoredEntry> {
        None
    }

    fn set(&self, _key: &str, _value: &Value, _ttl: Duration, _api_source: Option<&str>) {}

    fn delete(&self, _key: &str) {}

    fn clear_by_source(&self, _api_source: &str) -> usize {
        0
    }

    fn clear_all(&self) -> usize {
        0
    }

    fn cleanup(&self) -> usize {
        0
    }

    fn stats(&self) -> PersistentStats {
        PersistentStats::empty(false)
    }

    fn close(&self) {}
}
