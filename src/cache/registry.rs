//! Cache Registry Module
//!
//! Composition root: one persistent store, one facade per API domain.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::metrics::{bytes_to_mb, MetricsReport};
use crate::cache::persistent::open_or_disabled;
use crate::cache::{ApiDomain, CacheFacade, PersistentStore, VolatileCache};
use crate::config::Config;
use crate::error::Result;

/// Totals across every in-memory cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheSummary {
    pub total_hits: u64,
    pub total_misses: u64,
    pub total_memory_mb: f64,
}

impl CacheSummary {
    pub fn from_reports(reports: &[MetricsReport]) -> Self {
        let total_bytes: usize = reports.iter().map(|r| r.calculated_size).sum();

        Self {
            total_hits: reports.iter().map(|r| r.hits).sum(),
            total_misses: reports.iter().map(|r| r.misses).sum(),
            total_memory_mb: bytes_to_mb(total_bytes as u64),
        }
    }
}

// == Cache Registry ==
/// Owns every cache instance of the process.
#[derive(Clone)]
pub struct CacheRegistry {
    tmdb_search: CacheFacade,
    tmdb_details: CacheFacade,
    omdb_ratings: CacheFacade,
    persistent: Arc<dyn PersistentStore>,
}

impl CacheRegistry {
    /// Opens the persistent store named by `config` and builds the facades.
    pub fn from_config(config: &Config) -> Self {
        Self::with_persistent(config, open_or_disabled(config))
    }

    /// Builds the facades over an already opened persistent store.
    pub fn with_persistent(config: &Config, persistent: Arc<dyn PersistentStore>) -> Self {
        let build = |domain: ApiDomain| {
            let volatile = VolatileCache::new(domain.name())
                .with_enabled(config.volatile_cache_enabled)
                .with_max_entries(config.max_entries);
            CacheFacade::new(
                volatile,
                Arc::clone(&persistent),
                domain.api_source(),
                domain.ttl(config),
            )
        };

        let registry = Self {
            tmdb_search: build(ApiDomain::TmdbSearch),
            tmdb_details: build(ApiDomain::TmdbDetails),
            omdb_ratings: build(ApiDomain::OmdbRatings),
            persistent: Arc::clone(&persistent),
        };

        info!(
            volatile_enabled = config.volatile_cache_enabled,
            persistent_enabled = registry.persistent.is_enabled(),
            tmdb_search_ttl_s = config.tmdb_search_ttl.as_secs(),
            tmdb_details_ttl_s = config.tmdb_details_ttl.as_secs(),
            omdb_ratings_ttl_s = config.omdb_ratings_ttl.as_secs(),
            "Cache configuration loaded"
        );
        registry
    }

    pub fn facade(&self, domain: ApiDomain) -> &CacheFacade {
        match domain {
            ApiDomain::TmdbSearch => &self.tmdb_search,
            ApiDomain::TmdbDetails => &self.tmdb_details,
            ApiDomain::OmdbRatings => &self.omdb_ratings,
        }
    }

    /// Looks a facade up by its cache name, e.g. "tmdb-search".
    pub fn by_name(&self, name: &str) -> Result<&CacheFacade> {
        let domain: ApiDomain = name.parse()?;
        Ok(self.facade(domain))
    }

    pub fn facades(&self) -> [&CacheFacade; 3] {
        [&self.tmdb_search, &self.tmdb_details, &self.omdb_ratings]
    }

    pub fn persistent(&self) -> &Arc<dyn PersistentStore> {
        &self.persistent
    }

    /// In-memory tiers, for the sweep task.
    pub fn volatile_caches(&self) -> Vec<Arc<RwLock<VolatileCache>>> {
        self.facades().iter().map(|f| f.volatile()).collect()
    }

    /// Clears one in-memory cache by name, or all of them for "all".
    pub async fn clear_volatile(&self, name: &str) -> Result<()> {
        if name == "all" {
            self.clear_all_volatile().await;
            return Ok(());
        }
        self.by_name(name)?.clear_volatile().await;
        Ok(())
    }

    pub async fn clear_all_volatile(&self) {
        for facade in self.facades() {
            facade.clear_volatile().await;
        }
        info!("All in-memory caches cleared");
    }

    pub async fn reset_all_metrics(&self) {
        for facade in self.facades() {
            facade.reset_metrics().await;
        }
        info!("All cache metrics reset");
    }

    pub async fn reports(&self) -> Vec<MetricsReport> {
        let mut reports = Vec::with_capacity(3);
        for facade in self.facades() {
            reports.push(facade.report().await);
        }
        reports
    }
}
