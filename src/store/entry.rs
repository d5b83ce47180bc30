//! Stored Entry Module
//!
//! Value plus expiry metadata held by the in-process store.

use std::time::{SystemTime, UNIX_EPOCH};

// == Stored Entry ==
/// A single value held by [`MemoryStore`](super::MemoryStore).
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// The stored value
    pub value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoredEntry {
    // == Constructor ==
    /// Creates a new entry with optional TTL.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_seconds` - Optional TTL in seconds
    pub fn new(value: String, ttl_seconds: Option<u64>) -> Self {
        let mut entry = Self {
            value,
            expires_at: None,
        };
        if let Some(ttl) = ttl_seconds {
            entry.expire_in(ttl);
        }
        entry
    }

    /// Restarts the expiry clock at `ttl_seconds` from now.
    pub fn expire_in(&mut self, ttl_seconds: u64) {
        let now = current_timestamp_ms();
        self.expires_at = Some(now.saturating_add(ttl_seconds.saturating_mul(1000)));
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its expiration time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Same as [`is_expired`](Self::is_expired) against a caller-supplied clock.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in whole seconds, rounded up, or None without expiry.
    pub fn ttl_remaining(&self) -> Option<u64> {
        self.expires_at.map(|expires| {
            let now = current_timestamp_ms();
            let remaining_ms = expires.saturating_sub(now);
            remaining_ms.div_ceil(1000)
        })
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
