//! API Handlers
//!
//! HTTP request handlers for the cache admin endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheRegistry, PersistentStats, PersistentStore};
use crate::config::Config;
use crate::error::Result;
use crate::models::{
    CacheConfigInfo, CacheInfo, HealthResponse, InfoResponse, MessageResponse, RemovedResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Every cache of the process
    pub caches: CacheRegistry,
}

impl AppState {
    pub fn new(caches: CacheRegistry) -> Self {
        Self { caches }
    }

    /// Opens the persistent store and builds all facades from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheRegistry::from_config(config))
    }

    fn persistent(&self) -> Arc<dyn PersistentStore> {
        Arc::clone(self.caches.persistent())
    }
}

// SQLite work runs on the blocking pool. A panicked task reads as an empty result.
async fn run_blocking<T, F>(state: &AppState, op: F) -> T
where
    T: Default + Send + 'static,
    F: FnOnce(&dyn PersistentStore) -> T + Send + 'static,
{
    let store = state.persistent();
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .unwrap_or_default()
}

/// Handler for GET /api/cache/stats
///
/// In-memory metrics per cache, their totals, and the persistent report.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let reports = state.caches.reports().await;
    let persistent = run_blocking(&state, |store| store.stats()).await;

    Json(StatsResponse::new(reports, persistent))
}

/// Handler for GET /api/cache/info
///
/// Configuration and metrics of every in-memory cache.
pub async fn info_handler(State(state): State<AppState>) -> Json<InfoResponse> {
    let mut caches = Vec::new();

    for facade in state.caches.facades() {
        let metrics = facade.report().await;
        caches.push(CacheInfo {
            name: facade.name().to_string(),
            enabled: metrics.enabled,
            config: CacheConfigInfo {
                api_source: facade.api_source().to_string(),
                ttl_ms: u64::try_from(facade.default_ttl().as_millis()).unwrap_or(u64::MAX),
                max_entries: metrics.max_entries,
            },
            metrics,
        });
    }

    Json(InfoResponse::new(caches))
}

/// Handler for DELETE /api/cache/:cache_name
///
/// Clears one in-memory cache, or all of them for `all`.
pub async fn clear_cache_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.caches.clear_volatile(&cache_name).await?;

    Ok(Json(MessageResponse::new(format!(
        "Cache \"{cache_name}\" cleared successfully"
    ))))
}

/// Handler for POST /api/cache/metrics/reset
pub async fn reset_metrics_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.caches.reset_all_metrics().await;

    Json(MessageResponse::new("Cache metrics reset successfully"))
}

/// Handler for GET /api/persistent-cache/stats
pub async fn persistent_stats_handler(State(state): State<AppState>) -> Json<PersistentStats> {
    Json(run_blocking(&state, |store| store.stats()).await)
}

/// Handler for DELETE /api/persistent-cache/source/:api_source
pub async fn clear_source_handler(
    State(state): State<AppState>,
    Path(api_source): Path<String>,
) -> Json<RemovedResponse> {
    let source = api_source.clone();
    let removed = run_blocking(&state, move |store| store.clear_by_source(&source)).await;

    Json(RemovedResponse::new(
        format!("Cleared {removed} entries for {api_source}"),
        removed,
    ))
}

/// Handler for DELETE /api/persistent-cache
pub async fn clear_persistent_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = run_blocking(&state, |store| store.clear_all()).await;

    Json(RemovedResponse::new(format!("Cleared all {removed} entries"), removed))
}

/// Handler for POST /api/persistent-cache/cleanup
pub async fn cleanup_persistent_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = run_blocking(&state, |store| store.cleanup()).await;

    Json(RemovedResponse::new(
        format!("Cleaned up {removed} expired entries"),
        removed,
    ))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.caches.persistent().is_enabled()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ApiDomain, DisabledCache, SqliteCache};
    use crate::error::CacheError;
    use serde_json::json;
    use std::time::Duration;

    fn state() -> AppState {
        let store = Arc::new(SqliteCache::open_in_memory().unwrap());
        AppState::new(CacheRegistry::with_persistent(&Config::default(), store))
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = state();
        let search = state.caches.facade(ApiDomain::TmdbSearch);
        search.set("search:dune:multi", json!([]), None).await;
        search.get("search:dune:multi").await;

        let response = stats_handler(State(state)).await;
        assert_eq!(response.caches.len(), 3);
        assert_eq!(response.summary.total_hits, 1);
        assert_eq!(response.persistent.total_entries, 1);
    }

    #[tokio::test]
    async fn test_info_handler() {
        let response = info_handler(State(state())).await;

        let names: Vec<&str> = response.caches.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["tmdb-search", "tmdb-details", "omdb-ratings"]);
        assert_eq!(response.caches[0].config.ttl_ms, 86_400_000);
        assert_eq!(response.caches[2].config.api_source, "omdb");
    }

    #[tokio::test]
    async fn test_clear_cache_handler() {
        let state = state();
        let details = state.caches.facade(ApiDomain::TmdbDetails);
        details.set("details:movie:1", json!(1), None).await;

        let result = clear_cache_handler(State(state.clone()), Path("tmdb-details".to_string())).await;
        assert!(result.is_ok());
        assert_eq!(details.volatile().read().await.size(), 0);

        let result = clear_cache_handler(State(state), Path("imdb".to_string())).await;
        assert!(matches!(result, Err(CacheError::UnknownCache(_))));
    }

    #[tokio::test]
    async fn test_persistent_handlers() {
        let state = state();
        let store = state.caches.persistent();
        store.set("x", &json!(1), Duration::from_secs(60), Some("tmdb"));
        store.set("y", &json!(2), Duration::from_secs(60), Some("omdb"));
        store.set("z", &json!(3), Duration::from_millis(1), Some("omdb"));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let response = cleanup_persistent_handler(State(state.clone())).await;
        assert_eq!(response.removed, 1);

        let response = clear_source_handler(State(state.clone()), Path("tmdb".to_string())).await;
        assert_eq!(response.removed, 1);

        let response = persistent_stats_handler(State(state.clone())).await;
        assert_eq!(response.total_entries, 1);

        let response = clear_persistent_handler(State(state)).await;
        assert_eq!(response.removed, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler(State(state())).await;
        assert_eq!(response.status, "healthy");
        assert!(response.persistent_cache);

        let disabled = AppState::new(CacheRegistry::with_persistent(
            &Config::default(),
            Arc::new(DisabledCache::new()),
        ));
        assert!(!health_handler(State(disabled)).await.persistent_cache);
    }
}
