//! Error types for the offline cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the offline cache controller.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The origin could not be reached (offline, DNS, connection reset)
    #[error("Network unavailable: {0}")]
    Network(String),

    /// A static asset could not be fetched during install
    #[error("Static asset missing: {path} ({reason})")]
    AssetMissing { path: String, reason: String },

    /// Network failed and no cached fallback exists
    #[error("Offline and not cached: {0}")]
    OfflineMiss(String),

    /// A one-shot body was read twice or cloned after being read
    #[error("Body already used")]
    BodyUsed,

    /// Lifecycle transition requested from the wrong state
    #[error("Invalid lifecycle state: {0}")]
    InvalidState(String),

    /// Cache storage failure (open, read, write, delete)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Client enumeration or message post failed
    #[error("Client notification failed: {0}")]
    Notify(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request refused by proxy policy
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl CacheError {
    /// True for failures that a cache fallback can recover from.
    pub fn is_network(&self) -> bool {
        matches!(self, CacheError::Network(_))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Network(_) | CacheError::OfflineMiss(_) => StatusCode::GATEWAY_TIMEOUT,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Forbidden(_) => StatusCode::FORBIDDEN,
            CacheError::InvalidState(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::AssetMissing { .. }
            | CacheError::BodyUsed
            | CacheError::Storage(_)
            | CacheError::Notify(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the offline cache.
pub type Result<T> = std::result::Result<T, CacheError>;
