//! SQLite-backed persistent cache.
//!
//! One `api_cache` table holding JSON-encoded payloads. The connection sits
//! behind a mutex, so the read-check-increment sequence of a lookup runs as a
//! single critical section (and a single immediate transaction).

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::{
    PersistentStats, PersistentStore, PopularEntry, SourceStats, StoredEntry, DEFAULT_API_SOURCE,
    MOST_POPULAR_LIMIT,
};
use crate::cache::expiry;
use crate::cache::metrics::bytes_to_mb;
use crate::error::{CacheError, Result};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS api_cache (
        cache_key   TEXT PRIMARY KEY,
        cache_value TEXT NOT NULL,
        expires_at  INTEGER NOT NULL,
        created_at  INTEGER NOT NULL,
        api_source  TEXT NOT NULL,
        hit_count   INTEGER DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_expires_at ON api_cache(expires_at);
    CREATE INDEX IF NOT EXISTS idx_api_source ON api_cache(api_source);
    CREATE INDEX IF NOT EXISTS idx_created_at ON api_cache(created_at);
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistent cache stored in a SQLite database file.
pub struct SqliteCache {
    /// `None` once closed
    conn: Mutex<Option<Connection>>,
    path: PathBuf,
}

impl fmt::Debug for SqliteCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteCache")
            .field("path", &self.path)
            .field("open", &self.lock().is_some())
            .finish()
    }
}

impl SqliteCache {
    /// Opens (or creates) the cache database at `path`.
    ///
    /// Creates the parent directory, switches the journal to WAL, ensures the
    /// schema exists, and sweeps expired rows once.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CacheError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&path)
            .and_then(|conn| initialize(&conn).map(|()| conn))
            .map_err(|source| CacheError::Open {
                path: path.clone(),
                source,
            })?;

        let cache = Self {
            conn: Mutex::new(Some(conn)),
            path,
        };
        info!(path = %cache.path.display(), "Persistent cache initialized");

        cache.cleanup();
        Ok(cache)
    }

    /// Opens a private in-memory database. Nothing survives the handle.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .and_then(|conn| initialize(&conn).map(|()| conn))
            .map_err(|source| CacheError::Open {
                path: PathBuf::from(":memory:"),
                source,
            })?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: PathBuf::from(":memory:"),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.lock();
        let conn = guard.as_mut().ok_or(CacheError::Closed)?;
        f(conn)
    }
}

fn initialize(conn: &Connection) -> rusqlite::Result<()> {
    let journal_mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!(%journal_mode, "Persistent cache journal mode set");

    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch(SCHEMA)
}

/// Logs a failed operation and substitutes its empty result.
fn or_default<T>(operation: &'static str, result: Result<T>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(CacheError::Closed) => {
            debug!(operation, "Persistent cache is closed");
            fallback
        }
        Err(err) => {
            error!(operation, error = %err, "Persistent cache operation failed");
            fallback
        }
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn read_entry(conn: &mut Connection, key: &str, now: i64) -> Result<Option<StoredEntry>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let row: Option<(String, i64)> = tx
        .query_row(
            "SELECT cache_value, expires_at FROM api_cache WHERE cache_key = ?1",
            params![key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((raw, expires_at)) = row else {
        return Ok(None);
    };

    if expiry::is_expired(expires_at, now) {
        tx.execute("DELETE FROM api_cache WHERE cache_key = ?1", params![key])?;
        tx.commit()?;
        debug!(key, "Dropped expired persistent entry");
        return Ok(None);
    }

    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, error = %err, "Undecodable persistent entry treated as miss");
            return Ok(None);
        }
    };

    tx.execute(
        "UPDATE api_cache SET hit_count = hit_count + 1 WHERE cache_key = ?1",
        params![key],
    )?;
    tx.commit()?;

    Ok(Some(StoredEntry { value, expires_at }))
}

fn read_stats(conn: &Connection) -> Result<PersistentStats> {
    let total_entries: i64 =
        conn.query_row("SELECT COUNT(*) FROM api_cache", [], |row| row.get(0))?;

    let mut by_source_stmt = conn.prepare(
        "SELECT api_source, COUNT(*), COALESCE(SUM(hit_count), 0)
         FROM api_cache
         GROUP BY api_source",
    )?;
    let by_source = by_source_stmt
        .query_map([], |row| {
            let source: String = row.get(0)?;
            let stats = SourceStats {
                count: to_count(row.get(1)?),
                total_hits: to_count(row.get(2)?),
            };
            Ok((source, stats))
        })?
        .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

    let size_bytes: i64 = conn.query_row(
        "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
        [],
        |row| row.get(0),
    )?;

    let mut popular_stmt = conn.prepare(
        "SELECT cache_key, api_source, COALESCE(hit_count, 0)
         FROM api_cache
         ORDER BY hit_count DESC, cache_key ASC
         LIMIT ?1",
    )?;
    let most_popular = popular_stmt
        .query_map(params![MOST_POPULAR_LIMIT as i64], |row| {
            Ok(PopularEntry {
                cache_key: row.get(0)?,
                api_source: row.get(1)?,
                hit_count: to_count(row.get(2)?),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(PersistentStats {
        enabled: true,
        total_entries: to_count(total_entries),
        by_source,
        database_size_mb: bytes_to_mb(to_count(size_bytes)),
        most_popular,
        error: None,
    })
}

impl PersistentStore for SqliteCache {
    fn is_enabled(&self) -> bool {
        self.lock().is_some()
    }

    fn lookup(&self, key: &str) -> Option<StoredEntry> {
        let result = self.with_conn(|conn| read_entry(conn, key, expiry::now_ms()));
        or_default("get", result, None)
    }

    fn set(&self, key: &str, value: &Value, ttl: Duration, api_source: Option<&str>) {
        let result = self.with_conn(|conn| {
            let raw = serde_json::to_string(value)?;
            let now = expiry::now_ms();
            let expires_at = expiry::expires_at(now, ttl);
            let source = api_source.unwrap_or(DEFAULT_API_SOURCE);

            conn.execute(
                "INSERT INTO api_cache (cache_key, cache_value, expires_at, created_at, api_source, hit_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)
                 ON CONFLICT(cache_key) DO UPDATE SET
                     cache_value = excluded.cache_value,
                     expires_at = excluded.expires_at,
                     created_at = excluded.created_at",
                params![key, raw, expires_at, now, source],
            )?;
            Ok(())
        });
        or_default("set", result, ());
    }

    fn delete(&self, key: &str) {
        let result = self.with_conn(|conn| {
            conn.execute("DELETE FROM api_cache WHERE cache_key = ?1", params![key])?;
            Ok(())
        });
        or_default("delete", result, ());
    }

    fn clear_by_source(&self, api_source: &str) -> usize {
        let result = self.with_conn(|conn| {
            let removed =
                conn.execute("DELETE FROM api_cache WHERE api_source = ?1", params![api_source])?;
            info!(api_source, removed, "Cleared persistent entries by source");
            Ok(removed)
        });
        or_default("clear_by_source", result, 0)
    }

    fn clear_all(&self) -> usize {
        let result = self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM api_cache", [])?;
            info!(removed, "Cleared all persistent entries");
            Ok(removed)
        });
        or_default("clear_all", result, 0)
    }

    fn cleanup(&self) -> usize {
        let result = self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM api_cache WHERE expires_at < ?1",
                params![expiry::now_ms()],
            )?;
            if removed > 0 {
                info!(removed, "Cleaned up expired persistent entries");
            }
            Ok(removed)
        });
        or_default("cleanup", result, 0)
    }

    fn stats(&self) -> PersistentStats {
        match self.with_conn(|conn| read_stats(conn)) {
            Ok(stats) => stats,
            Err(CacheError::Closed) => PersistentStats::empty(false),
            Err(err) => {
                error!(error = %err, "Persistent cache stats failed");
                PersistentStats {
                    error: Some(err.to_string()),
                    ..PersistentStats::empty(true)
                }
            }
        }
    }

    fn close(&self) {
        let Some(conn) = self.lock().take() else {
            return;
        };

        match conn.close() {
            Ok(()) => info!(path = %self.path.display(), "Persistent cache closed"),
            Err((_, err)) => warn!(error = %err, "Persistent cache closed with error"),
        }
    }
}
