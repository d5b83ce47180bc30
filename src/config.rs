//! Configuration Module
//!
//! Handles loading and managing cache, store and server configuration from
//! environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheDomain, TtlPolicy};
use crate::rate_limit::RateLimitPolicy;
use crate::store::{RedisConfig, RetryPolicy};

/// Which store implementation backs the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Remote Redis server
    Redis,
    /// In-process store, useful without a Redis server
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store implementation
    pub backend: StoreBackend,
    /// Redis host
    pub redis_host: String,
    /// Redis port
    pub redis_port: u16,
    /// Redis password, if the server requires auth
    pub redis_password: Option<String>,
    /// Database index for general caching
    pub redis_db: i64,
    /// Database index for session data
    pub redis_session_db: i64,
    /// Connect timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Per-command timeout in milliseconds
    pub command_timeout_ms: u64,
    /// Attempts per command, including the first
    pub max_retries: u32,
    /// Backoff step in milliseconds
    pub retry_base_ms: u64,
    /// Backoff cap in milliseconds
    pub retry_max_ms: u64,
    /// Per-domain TTLs
    pub ttls: TtlPolicy,
    /// Requests allowed per window on the HTTP surface
    pub rate_limit_max: u64,
    /// Rate-limit window in seconds
    pub rate_limit_window: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Sweep interval in seconds for the in-memory store
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `REDIS_HOST` / `REDIS_PORT` - Store address (default: 127.0.0.1:6379)
    /// - `REDIS_PASSWORD` - Store password (default: none)
    /// - `REDIS_DB` / `REDIS_SESSION_DB` - Database indexes (default: 0 / 1)
    /// - `REDIS_CONNECT_TIMEOUT_MS` / `REDIS_COMMAND_TIMEOUT_MS` (default: 5000 / 3000)
    /// - `REDIS_MAX_RETRIES` / `REDIS_RETRY_BASE_MS` / `REDIS_RETRY_MAX_MS` (default: 3 / 50 / 2000)
    /// - `CACHE_TTL_<DOMAIN>` - TTL override per domain, e.g. `CACHE_TTL_FLIGHTS`
    /// - `RATE_LIMIT_MAX` / `RATE_LIMIT_WINDOW` (default: 100 / 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Memory store sweep in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut ttls = TtlPolicy::default();
        for domain in CacheDomain::ALL {
            let var = format!("CACHE_TTL_{}", domain.as_str().to_ascii_uppercase());
            if let Some(ttl) = env_parse::<u64>(&var) {
                ttls = ttls.with_ttl(domain, ttl);
            }
        }

        Self {
            backend: env_parse("CACHE_BACKEND").unwrap_or(defaults.backend),
            redis_host: env::var("REDIS_HOST").unwrap_or(defaults.redis_host),
            redis_port: env_parse("REDIS_PORT").unwrap_or(defaults.redis_port),
            redis_password: env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty()),
            redis_db: env_parse("REDIS_DB").unwrap_or(defaults.redis_db),
            redis_session_db: env_parse("REDIS_SESSION_DB").unwrap_or(defaults.redis_session_db),
            connect_timeout_ms: env_parse("REDIS_CONNECT_TIMEOUT_MS")
                .unwrap_or(defaults.connect_timeout_ms),
            command_timeout_ms: env_parse("REDIS_COMMAND_TIMEOUT_MS")
                .unwrap_or(defaults.command_timeout_ms),
            max_retries: env_parse("REDIS_MAX_RETRIES").unwrap_or(defaults.max_retries),
            retry_base_ms: env_parse("REDIS_RETRY_BASE_MS").unwrap_or(defaults.retry_base_ms),
            retry_max_ms: env_parse("REDIS_RETRY_MAX_MS").unwrap_or(defaults.retry_max_ms),
            ttls,
            rate_limit_max: env_parse("RATE_LIMIT_MAX").unwrap_or(defaults.rate_limit_max),
            rate_limit_window: env_parse("RATE_LIMIT_WINDOW")
                .unwrap_or(defaults.rate_limit_window),
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
            sweep_interval: env_parse("SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
        }
    }

    /// Store settings for the general-purpose cache database.
    pub fn cache_store(&self) -> RedisConfig {
        self.redis_config(self.redis_db)
    }

    /// Store settings for the session database.
    pub fn session_store(&self) -> RedisConfig {
        self.redis_config(self.redis_session_db)
    }

    /// Limits applied by the HTTP rate-limit middleware.
    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(self.rate_limit_max, self.rate_limit_window)
    }

    fn redis_config(&self, db: i64) -> RedisConfig {
        RedisConfig {
            host: self.redis_host.clone(),
            port: self.redis_port,
            password: self.redis_password.clone(),
            db,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            command_timeout: Duration::from_millis(self.command_timeout_ms),
            retry: RetryPolicy::new(
                self.max_retries,
                Duration::from_millis(self.retry_base_ms),
                Duration::from_millis(self.retry_max_ms),
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
            redis_password: None,
            redis_db: 0,
            redis_session_db: 1,
            connect_timeout_ms: 5000,
            command_timeout_ms: 3000,
            max_retries: 3,
            retry_base_ms: 50,
            retry_max_ms: 2000,
            ttls: TtlPolicy::default(),
            rate_limit_max: 100,
            rate_limit_window: 60,
            server_port: 3000,
            sweep_interval: 30,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
