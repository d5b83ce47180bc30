//! Request DTOs for the cache API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Request body for PUT /cache/:domain/:key
///
/// # Fields
/// - `value`: Any JSON value to cache
/// - `ttl`: Optional TTL in seconds (uses the domain default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct CacheValueRequest {
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl CacheValueRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.ttl == Some(0) {
            return Some("TTL must be at least one second".to_string());
        }
        None
    }
}

/// Request body for POST /rate-limit/check
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitRequest {
    /// Caller identifier, e.g. an IP address or API key
    pub identifier: String,
    /// Requests allowed per window
    pub limit: u64,
    /// Window length in seconds
    pub window: u64,
}

impl RateLimitRequest {
    pub fn validate(&self) -> Option<String> {
        if self.identifier.trim().is_empty() {
            return Some("Identifier cannot be empty".to_string());
        }
        if self.window == 0 {
            return Some("Window must be at least one second".to_string());
        }
        None
    }
}

/// Validates a caller-supplied key suffix from the URL.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > 256 {
        return Some("Key exceeds maximum length of 256 characters".to_string());
    }
    None
}
