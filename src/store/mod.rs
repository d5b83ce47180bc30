//! Store Module
//!
//! Key-value store abstraction consumed by the cache facade and the rate
//! limiter, with a Redis implementation and an in-process implementation.

mod entry;
mod memory;
mod redis;
mod retry;

use async_trait::async_trait;

use crate::error::Result;

// Re-export public types
pub use self::redis::{RedisConfig, RedisStore};
pub use entry::{current_timestamp_ms, StoredEntry};
pub use memory::MemoryStore;
pub use retry::RetryPolicy;

// == Key Value Store ==
/// Primitives the cache layer needs from a remote key-value service.
///
/// Implementations must make `increment` and `increment_window` atomic and
/// `set` last-writer-wins. Expiry is entirely the store's job.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Opens the connection eagerly. Operations connect lazily otherwise.
    async fn connect(&self) -> Result<()>;

    /// Drops the connection; the next operation reconnects.
    async fn disconnect(&self) -> Result<()>;

    /// Returns true when the store answers.
    async fn ping(&self) -> Result<bool>;

    /// Fetches the raw value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` without expiry.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Stores `value`, expiring after `ttl_secs`.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Removes `key`. Returns true when something was deleted.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Atomically increments the integer under `key`, creating it at 0.
    async fn increment(&self, key: &str) -> Result<i64>;

    /// Sets the expiry of an existing key. Returns false if the key is absent.
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool>;

    /// Remaining lifetime in seconds; None for missing keys or keys without expiry.
    async fn ttl(&self, key: &str) -> Result<Option<u64>>;

    /// Increments `key` and, if that created it, sets its expiry to
    /// `window_secs`, as one atomic step.
    async fn increment_window(&self, key: &str, window_secs: u64) -> Result<i64>;
}
