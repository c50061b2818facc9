//! Persistent Cache Module
//!
//! Disk-backed TTL cache shared by every facade in the process, grouped by
//! `api_source` for bulk invalidation and analytics.
//!
//! Two implementations of [`PersistentStore`]:
//! - [`SqliteCache`] - the real store, opened with [`SqliteCache::open`]
//! - [`DisabledCache`] - null object used when persistence is turned off or
//!   failed to initialize

mod disabled;
mod sqlite;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::config::Config;

pub use disabled::DisabledCache;
pub use sqlite::SqliteCache;

/// Source tag recorded when the caller does not supply one.
pub const DEFAULT_API_SOURCE: &str = "unknown";

/// Number of entries listed in [`PersistentStats::most_popular`].
pub const MOST_POPULAR_LIMIT: usize = 10;

// == Stored Entry ==
/// A live value read from the store together with its expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub value: Value,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: i64,
}

// == Stats ==
/// Per-source aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceStats {
    pub count: u64,
    pub total_hits: u64,
}

/// One row of the most-popular listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularEntry {
    pub cache_key: String,
    pub api_source: String,
    pub hit_count: u64,
}

/// Read-only usage report of the persistent store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PersistentStats {
    pub enabled: bool,
    pub total_entries: u64,
    pub by_source: BTreeMap<String, SourceStats>,
    pub database_size_mb: f64,
    pub most_popular: Vec<PopularEntry>,
    /// Set when the report could not be computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PersistentStats {
    /// Report with no entries.
    pub fn empty(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }
}

// == Persistent Store Trait ==
/// Contract shared by the SQLite store and its disabled stand-in.
///
/// No method fails: storage errors are logged and turned into the empty
/// result of the operation, so a broken store behaves like a cold one.
pub trait PersistentStore: Send + Sync {
    fn is_enabled(&self) -> bool;

    /// Live entry for `key`, counting one hit. Expired entries are deleted
    /// and reported as absent.
    fn lookup(&self, key: &str) -> Option<StoredEntry>;

    /// Value for `key`, see [`PersistentStore::lookup`].
    fn get(&self, key: &str) -> Option<Value> {
        self.lookup(key).map(|entry| entry.value)
    }

    /// Upserts `key`. The hit count of an existing row is preserved;
    /// `api_source` falls back to [`DEFAULT_API_SOURCE`].
    fn set(&self, key: &str, value: &Value, ttl: Duration, api_source: Option<&str>);

    fn delete(&self, key: &str);

    /// Deletes every row tagged with `api_source`, returning the count.
    fn clear_by_source(&self, api_source: &str) -> usize;

    /// Deletes every row, returning the count.
    fn clear_all(&self) -> usize;

    /// Deletes expired rows, returning the count.
    fn cleanup(&self) -> usize;

    /// Aggregate usage report. Does not touch hit counts.
    fn stats(&self) -> PersistentStats;

    /// Releases the store handle. Idempotent.
    fn close(&self);
}

// == Composition ==
/// Opens the configured persistent store, falling back to [`DisabledCache`]
/// when persistence is switched off or the database cannot be initialized.
pub fn open_or_disabled(config: &Config) -> Arc<dyn PersistentStore> {
    if !config.persistent_cache_enabled {
        info!("Persistent cache disabled by configuration");
        return Arc::new(DisabledCache::new());
    }

    match SqliteCache::open(config.cache_db_path()) {
        Ok(cache) => Arc::new(cache),
        Err(err) => {
            error!(error = %err, "Persistent cache initialization failed, continuing without it");
            Arc::new(DisabledCache::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_or_disabled_respects_flag() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            database_path: dir.path().to_path_buf(),
            persistent_cache_enabled: false,
            ..Config::default()
        };

        let store = open_or_disabled(&config);
        assert!(!store.is_enabled());
        assert!(!config.cache_db_path().exists());
    }

    #[test]
    fn test_open_or_disabled_opens_database() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            database_path: dir.path().join("nested"),
            ..Config::default()
        };

        let store = open_or_disabled(&config);
        assert!(store.is_enabled());
        assert!(config.cache_db_path().exists());
        store.close();
    }

    #[test]
    fn test_open_or_disabled_falls_back_on_failure() {
        let dir = TempDir::new().unwrap();
        // A regular file where the database directory should be
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let config = Config {
            database_path: blocker,
            ..Config::default()
        };

        let store = open_or_disabled(&config);
        assert!(!store.is_enabled());
        assert_eq!(store.get("anything"), None);
    }
}
