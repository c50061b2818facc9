//! API Module
//!
//! HTTP handlers and routing for the cache admin REST API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /api/cache/stats` - In-memory and persistent statistics
//! - `GET /api/cache/info` - Per-cache configuration
//! - `DELETE /api/cache/:cache_name` - Clear an in-memory cache
//! - `POST /api/cache/metrics/reset` - Reset in-memory metrics
//! - `/api/persistent-cache/...` - Persistent store maintenance

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
