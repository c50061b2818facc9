//! API Routes
//!
//! Configures the Axum router with the cache admin endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_persistent_handler, clear_cache_handler, clear_persistent_handler,
    clear_source_handler, health_handler, info_handler, persistent_stats_handler,
    reset_metrics_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check
/// - `GET /api/cache/stats` - In-memory metrics plus persistent report
/// - `GET /api/cache/info` - Per-cache configuration and metrics
/// - `DELETE /api/cache/:cache_name` - Clear one in-memory cache or `all`
/// - `POST /api/cache/metrics/reset` - Zero all in-memory counters
/// - `GET /api/persistent-cache/stats` - Persistent report
/// - `DELETE /api/persistent-cache` - Clear the persistent store
/// - `DELETE /api/persistent-cache/source/:api_source` - Clear one source
/// - `POST /api/persistent-cache/cleanup` - Sweep expired rows now
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/cache/stats", get(stats_handler))
        .route("/api/cache/info", get(info_handler))
        .route("/api/cache/metrics/reset", post(reset_metrics_handler))
        .route("/api/cache/:cache_name", delete(clear_cache_handler))
        .route("/api/persistent-cache", delete(clear_persistent_handler))
        .route("/api/persistent-cache/stats", get(persistent_stats_handler))
        .route("/api/persistent-cache/cleanup", post(cleanup_persistent_handler))
        .route(
            "/api/persistent-cache/source/:api_source",
            delete(clear_source_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
