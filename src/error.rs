//! Error types for the durable cache
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache manager and its HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Durable store could not be opened or read while loading
    #[error("Failed to open durable store at {}: {source}", .path.display())]
    StoreOpen {
        path: PathBuf,
        #[source]
        source: redb::Error,
    },

    /// Durable write of the collection did not commit
    #[error("Failed to persist snapshot under key '{key}': {source}")]
    Persist {
        key: String,
        #[source]
        source: redb::Error,
    },

    /// Collection could not be serialized, nothing was written
    #[error("Failed to encode snapshot under key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Record not found in cache
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Returns true for failures that leave the mutation unpersisted.
    pub fn is_persist_failure(&self) -> bool {
        matches!(self, CacheError::Persist { .. } | CacheError::Encode { .. })
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::StoreOpen { .. }
            | CacheError::Persist { .. }
            | CacheError::Encode { .. } => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
