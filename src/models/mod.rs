//! Response models for the cache admin API
//!
//! DTOs serialized as HTTP response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{
    CacheConfigInfo, CacheInfo, HealthResponse, InfoResponse, MessageResponse, RemovedResponse,
    StatsResponse,
};
