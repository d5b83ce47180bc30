//! API Handlers
//!
//! HTTP request handlers exposing the cache facade and the rate limiter.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheDomain, CacheFacade, StatsSnapshot, TtlPolicy};
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, CacheValueRequest, CacheWriteResponse, CachedValueResponse, HealthResponse,
    RateLimitRequest,
};
use crate::rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimiter};
use crate::store::{KeyValueStore, MemoryStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Domain cache
    pub cache: Arc<CacheFacade>,
    /// Limiter shared by the middleware and the check endpoint
    pub limiter: RateLimiter,
    /// Budget applied to callers of the cache routes
    pub policy: RateLimitPolicy,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(cache: CacheFacade, limiter: RateLimiter, policy: RateLimitPolicy) -> Self {
        Self {
            cache: Arc::new(cache),
            limiter,
            policy,
        }
    }

    /// Builds state over a single in-process store.
    pub fn in_memory(ttls: TtlPolicy, policy: RateLimitPolicy) -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        Self::new(
            CacheFacade::single(store.clone(), ttls),
            RateLimiter::new(store),
            policy,
        )
    }
}

/// Parses and validates the `:domain/:key` path pair.
fn parse_target(domain: &str, key: &str) -> Result<CacheDomain> {
    if let Some(error_msg) = validate_key(key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }
    domain.parse()
}

/// Handler for PUT /cache/:domain/:key
///
/// Caches a JSON value under the domain with an optional TTL override.
pub async fn put_cache_handler(
    State(state): State<AppState>,
    Path((domain, key)): Path<(String, String)>,
    Json(req): Json<CacheValueRequest>,
) -> Result<Json<CacheWriteResponse>> {
    let domain = parse_target(&domain, &key)?;
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let applied = state.cache.cache_for(domain, &key, &req.value, req.ttl).await;
    Ok(Json(CacheWriteResponse::new(domain, key, applied)))
}

/// Handler for GET /cache/:domain/:key
///
/// Store failures look exactly like a miss.
pub async fn get_cache_handler(
    State(state): State<AppState>,
    Path((domain, key)): Path<(String, String)>,
) -> Result<Json<CachedValueResponse>> {
    let domain = parse_target(&domain, &key)?;

    match state.cache.get_for::<Value>(domain, &key).await {
        Some(value) => Ok(Json(CachedValueResponse::new(domain, key, value))),
        None => Err(CacheError::NotFound(domain.key(&key))),
    }
}

/// Handler for DELETE /cache/:domain/:key
pub async fn delete_cache_handler(
    State(state): State<AppState>,
    Path((domain, key)): Path<(String, String)>,
) -> Result<Json<CacheWriteResponse>> {
    let domain = parse_target(&domain, &key)?;

    let applied = state.cache.clear_for(domain, &key).await;
    Ok(Json(CacheWriteResponse::new(domain, key, applied)))
}

/// Handler for POST /rate-limit/check
pub async fn rate_limit_handler(
    State(state): State<AppState>,
    Json(req): Json<RateLimitRequest>,
) -> Result<Json<RateLimitDecision>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let decision = state
        .limiter
        .check(&req.identifier, req.limit, req.window)
        .await;
    Ok(Json(decision))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.cache.stats())
}

/// Handler for GET /health
///
/// Pings both stores; reports "degraded" instead of failing.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_health(state.cache.ping().await))
}
