//! Response DTOs for the cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheDomain, StoreHealth};

/// Response body for GET /cache/:domain/:key
#[derive(Debug, Clone, Serialize)]
pub struct CachedValueResponse {
    pub domain: CacheDomain,
    pub key: String,
    pub value: Value,
}

impl CachedValueResponse {
    pub fn new(domain: CacheDomain, key: impl Into<String>, value: Value) -> Self {
        Self {
            domain,
            key: key.into(),
            value,
        }
    }
}

/// Response body for PUT and DELETE on /cache/:domain/:key
///
/// `applied` is false when the store could not be reached; the request
/// itself still succeeds.
#[derive(Debug, Clone, Serialize)]
pub struct CacheWriteResponse {
    pub domain: CacheDomain,
    pub key: String,
    pub applied: bool,
}

impl CacheWriteResponse {
    pub fn new(domain: CacheDomain, key: impl Into<String>, applied: bool) -> Self {
        Self {
            domain,
            key: key.into(),
            applied,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" when both stores answer, "degraded" otherwise
    pub status: String,
    pub cache_store: bool,
    pub session_store: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a HealthResponse with current timestamp
    pub fn from_health(health: StoreHealth) -> Self {
        let status = if health.is_healthy() {
            "healthy"
        } else {
            "degraded"
        };
        Self {
            status: status.to_string(),
            cache_store: health.cache,
            session_store: health.session,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cached_value_response_serialize() {
        let resp = CachedValueResponse::new(CacheDomain::Hotels, "rome", json!([1]));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["domain"], "hotels");
        assert_eq!(json["key"], "rome");
        assert_eq!(json["value"], json!([1]));
    }

    #[test]
    fn test_write_response_serialize() {
        let resp = CacheWriteResponse::new(CacheDomain::Session, "42", false);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["domain"], "session");
        assert_eq!(json["applied"], false);
    }

    #[test]
    fn test_health_response_status() {
        let healthy = HealthResponse::from_health(StoreHealth {
            cache: true,
            session: true,
        });
        assert_eq!(healthy.status, "healthy");

        let degraded = HealthResponse::from_health(StoreHealth {
            cache: true,
            session: false,
        });
        assert_eq!(degraded.status, "degraded");
        assert!(!degraded.session_store);
    }
}
