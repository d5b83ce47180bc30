//! Rate limiter implementation
//!
//! Fixed-window counters kept in the key-value store. A window opens on an
//! identifier's first request and closes when the store expires the counter.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::store::KeyValueStore;

/// Key prefix for rate-limit counters.
pub const RATE_LIMIT_PREFIX: &str = "rate_limit";

/// Result of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Remaining requests in the current window
    pub remaining: u64,
    /// Total limit for the window
    pub limit: u64,
    /// Seconds until the current window closes
    pub reset_in: u64,
}

impl RateLimitDecision {
    fn from_count(count: i64, limit: u64, reset_in: u64) -> Self {
        let count = count.max(0) as u64;
        Self {
            allowed: count <= limit,
            remaining: limit.saturating_sub(count),
            limit,
            reset_in,
        }
    }

    fn fail_open(limit: u64, window_secs: u64) -> Self {
        Self {
            allowed: true,
            remaining: limit,
            limit,
            reset_in: window_secs,
        }
    }
}

/// Limit and window applied to HTTP callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub limit: u64,
    pub window_secs: u64,
}

impl RateLimitPolicy {
    pub fn new(limit: u64, window_secs: u64) -> Self {
        Self { limit, window_secs }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new(100, 60)
    }
}

/// Fixed-window rate limiter over a shared store
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(identifier: &str) -> String {
        format!("{}:{}", RATE_LIMIT_PREFIX, identifier)
    }

    /// Counts one request for `identifier` against `limit` per `window_secs`.
    ///
    /// Fails open: if the store cannot be reached the request is allowed
    /// with the full budget reported as remaining.
    pub async fn check(&self, identifier: &str, limit: u64, window_secs: u64) -> RateLimitDecision {
        let key = Self::key(identifier);
        let window_secs = window_secs.max(1);

        match self.store.increment_window(&key, window_secs).await {
            Ok(count) => {
                let reset_in = self.reset_in(&key, window_secs).await;
                let decision = RateLimitDecision::from_count(count, limit, reset_in);
                if !decision.allowed {
                    debug!("Rate limit exceeded for '{}' ({}/{})", identifier, count, limit);
                }
                decision
            }
            Err(e) => {
                warn!("Rate limit check for '{}' failed open: {}", identifier, e);
                RateLimitDecision::fail_open(limit, window_secs)
            }
        }
    }

    /// Remaining window from the counter's TTL; the full window if unknown.
    async fn reset_in(&self, key: &str, window_secs: u64) -> u64 {
        match self.store.ttl(key).await {
            Ok(Some(ttl)) => ttl.min(window_secs),
            Ok(None) => window_secs,
            Err(e) => {
                debug!("TTL lookup for '{}' failed: {}", key, e);
                window_secs
            }
        }
    }

    /// Checks against a preconfigured policy.
    pub async fn check_policy(&self, identifier: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        self.check(identifier, policy.limit, policy.window_secs)
            .await
    }

    /// Reset rate limits for an identifier. Returns false on store error.
    pub async fn reset(&self, identifier: &str) -> bool {
        match self.store.delete(&Self::key(identifier)).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Rate limit reset for '{}' failed: {}", identifier, e);
                false
            }
        }
    }
}
