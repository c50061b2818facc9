//! Cache Module
//!
//! Two-tier caching in front of the external movie APIs:
//! - [`VolatileCache`] - per-facade in-memory TTL store
//! - [`PersistentStore`] - process-wide SQLite store grouped by `api_source`
//! - [`CacheFacade`] - read-through composition of both for one API domain
//! - [`CacheRegistry`] - composition root holding every facade

mod domain;
mod entry;
pub mod expiry;
mod facade;
mod lru;
pub mod metrics;
pub mod persistent;
mod registry;
mod volatile;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use domain::{details_key, ratings_key, search_key, ApiDomain};
pub use entry::VolatileEntry;
pub use facade::CacheFacade;
pub use lru::LruTracker;
pub use metrics::{CacheMetrics, MetricsReport};
pub use persistent::{
    DisabledCache, PersistentStats, PersistentStore, SqliteCache, StoredEntry, DEFAULT_API_SOURCE,
};
pub use registry::{CacheRegistry, CacheSummary};
pub use volatile::VolatileCache;
