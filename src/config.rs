//! Configuration Module
//!
//! Handles loading the cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// File name of the persistent cache inside `database_path`.
pub const CACHE_DB_FILE: &str = "cache.db";

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port of the admin API
    pub server_port: u16,
    /// Directory holding the persistent cache database
    pub database_path: PathBuf,
    /// When false the persistent tier is never opened
    pub persistent_cache_enabled: bool,
    /// When false every volatile cache behaves as permanently cold
    pub volatile_cache_enabled: bool,
    /// TTL for TMDB search results
    pub tmdb_search_ttl: Duration,
    /// TTL for TMDB movie/tv details
    pub tmdb_details_ttl: Duration,
    /// TTL for OMDb ratings
    pub omdb_ratings_ttl: Duration,
    /// Interval between volatile cache sweeps
    pub volatile_sweep_interval: Duration,
    /// Interval between persistent cache sweeps
    pub persistent_sweep_interval: Duration,
    /// Optional per-volatile-cache capacity, None = unbounded
    pub max_entries: Option<usize>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - Admin HTTP port (default: 3000)
    /// - `DATABASE_PATH` - Directory for `cache.db` (default: ./db)
    /// - `PERSISTENT_CACHE_ENABLED` - `false` disables persistence
    /// - `CACHE_ENABLED` - `false` disables the in-memory caches
    /// - `CACHE_TTL_TMDB_SEARCH` - TTL in ms (default: 24 hours)
    /// - `CACHE_TTL_TMDB_DETAILS` - TTL in ms (default: 7 days)
    /// - `CACHE_TTL_OMDB_RATINGS` - TTL in ms (default: 7 days)
    /// - `VOLATILE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `PERSISTENT_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 21600)
    /// - `CACHE_MAX_ENTRIES` - Capacity per in-memory cache (default: unbounded)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            database_path: env::var("DATABASE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            persistent_cache_enabled: flag_var("PERSISTENT_CACHE_ENABLED"),
            volatile_cache_enabled: flag_var("CACHE_ENABLED"),
            tmdb_search_ttl: parse_var("CACHE_TTL_TMDB_SEARCH")
                .map(Duration::from_millis)
                .unwrap_or(defaults.tmdb_search_ttl),
            tmdb_details_ttl: parse_var("CACHE_TTL_TMDB_DETAILS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.tmdb_details_ttl),
            omdb_ratings_ttl: parse_var("CACHE_TTL_OMDB_RATINGS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.omdb_ratings_ttl),
            volatile_sweep_interval: parse_var("VOLATILE_SWEEP_INTERVAL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.volatile_sweep_interval),
            persistent_sweep_interval: parse_var("PERSISTENT_SWEEP_INTERVAL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.persistent_sweep_interval),
            max_entries: parse_var::<usize>("CACHE_MAX_ENTRIES").filter(|n| *n > 0),
        }
    }

    /// Full path of the persistent cache database file.
    pub fn cache_db_path(&self) -> PathBuf {
        self.database_path.join(CACHE_DB_FILE)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            database_path: PathBuf::from("db"),
            persistent_cache_enabled: true,
            volatile_cache_enabled: true,
            tmdb_search_ttl: Duration::from_millis(86_400_000),
            tmdb_details_ttl: Duration::from_millis(604_800_000),
            omdb_ratings_ttl: Duration::from_millis(604_800_000),
            volatile_sweep_interval: Duration::from_secs(5 * 60),
            persistent_sweep_interval: Duration::from_secs(6 * 60 * 60),
            max_entries: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

// Anything but a literal "false" keeps the feature on.
fn flag_var(name: &str) -> bool {
    env::var(name).map(|v| v.trim() != "false").unwrap_or(true)
}
