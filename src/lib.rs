//! WatchOrNot Cache - two-tier caching for third-party movie APIs
//!
//! An in-memory TTL tier and a SQLite-backed tier, composed per external API
//! family (TMDB search, TMDB details, OMDb ratings), with background expiry
//! sweeps and a small admin HTTP API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{ApiDomain, CacheFacade, CacheRegistry};
pub use config::Config;
pub use tasks::BackgroundTasks;
