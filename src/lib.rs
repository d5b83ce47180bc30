//! Booking Cache - TTL cache and rate limiter for booking search endpoints
//!
//! Provides domain-scoped JSON caching and fixed-window rate limiting over
//! Redis, degrading to "not cached" and "not limited" when the store fails.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheDomain, CacheFacade, QueryKey, TtlPolicy};
pub use config::Config;
pub use error::CacheError;
pub use rate_limit::{RateLimitDecision, RateLimiter};
pub use store::{KeyValueStore, MemoryStore, RedisStore};
pub use tasks::spawn_sweeper;
