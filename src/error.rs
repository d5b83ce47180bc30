//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror. Store adapters return
//! these errors; the facade and rate limiter turn them into degraded-mode
//! values, and only the HTTP layer ever renders them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Store unreachable, connection refused or dropped
    #[error("Connection error: {0}")]
    Connection(String),

    /// Connect or command exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Store rejected the command (wrong type, script error, ...)
    #[error("Command failed: {0}")]
    Command(String),

    /// Value could not be encoded or decoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Caller exceeded its request budget
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),
}

impl CacheError {
    /// Returns true for failures worth retrying at the connection level.
    pub fn is_transient(&self) -> bool {
        matches!(self, CacheError::Connection(_) | CacheError::Timeout(_))
    }
}

// == Conversions ==
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_timeout() {
            CacheError::Timeout(err.to_string())
        } else if err.is_connection_dropped() || err.is_connection_refusal() || err.is_io_error()
        {
            CacheError::Connection(err.to_string())
        } else {
            CacheError::Command(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::Serialization(_) => {
                StatusCode::BAD_REQUEST
            }
            CacheError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            CacheError::Connection(_) | CacheError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Command(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
