//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror. Cache operations never
//! surface these to their callers; they are logged and converted to the
//! operation's empty result at the public boundary. Only initialization and
//! the admin API hand them out.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::cache::ApiDomain;

// == Cache Error Enum ==
/// Unified error type for the cache layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The directory holding the cache database could not be created
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache database could not be opened or initialized
    #[error("Failed to open cache database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A query against the cache database failed
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store handle was already released
    #[error("Cache store is closed")]
    Closed,

    /// Admin API referenced a cache that does not exist
    #[error("Invalid cache name: {0}")]
    UnknownCache(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        match &self {
            CacheError::UnknownCache(name) => {
                let mut valid_names: Vec<&str> = ApiDomain::ALL.iter().map(|d| d.name()).collect();
                valid_names.push("all");
                let body = Json(json!({
                    "error": "Invalid cache name",
                    "cache_name": name,
                    "valid_names": valid_names,
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            _ => {
                let body = Json(json!({
                    "error": self.to_string()
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
