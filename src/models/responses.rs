//! Response DTOs for the cache admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheSummary, MetricsReport, PersistentStats};

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Response body for GET /api/cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    /// ISO 8601 time the report was taken
    pub timestamp: String,
    /// One report per in-memory cache
    pub caches: Vec<MetricsReport>,
    pub summary: CacheSummary,
    pub persistent: PersistentStats,
}

impl StatsResponse {
    pub fn new(caches: Vec<MetricsReport>, persistent: PersistentStats) -> Self {
        Self {
            success: true,
            timestamp: now_rfc3339(),
            summary: CacheSummary::from_reports(&caches),
            caches,
            persistent,
        }
    }
}

/// Static configuration of one cache, as reported by GET /api/cache/info
#[derive(Debug, Clone, Serialize)]
pub struct CacheConfigInfo {
    pub api_source: String,
    pub ttl_ms: u64,
    pub max_entries: Option<usize>,
}

/// Configuration plus live metrics of one cache
#[derive(Debug, Clone, Serialize)]
pub struct CacheInfo {
    pub name: String,
    pub enabled: bool,
    pub config: CacheConfigInfo,
    pub metrics: MetricsReport,
}

/// Response body for GET /api/cache/info
#[derive(Debug, Clone, Serialize)]
pub struct InfoResponse {
    pub success: bool,
    pub caches: Vec<CacheInfo>,
}

impl InfoResponse {
    pub fn new(caches: Vec<CacheInfo>) -> Self {
        Self {
            success: true,
            caches,
        }
    }
}

/// Response body for operations that only acknowledge
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Response body for persistent bulk deletes and sweeps
#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    pub success: bool,
    pub message: String,
    /// Number of rows deleted
    pub removed: usize,
}

impl RemovedResponse {
    pub fn new(message: impl Into<String>, removed: usize) -> Self {
        Self {
            success: true,
            message: message.into(),
            removed,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Whether the persistent tier is usable
    pub persistent_cache: bool,
}

impl HealthResponse {
    pub fn healthy(persistent_cache: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: now_rfc3339(),
            persistent_cache,
        }
    }
}
