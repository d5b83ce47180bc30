//! In-process key-value store
//!
//! HashMap storage with per-entry expiry, mirroring the subset of Redis
//! semantics the cache layer relies on.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::entry::{current_timestamp_ms, StoredEntry};
use super::KeyValueStore;
use crate::error::{CacheError, Result};

// == Memory Store ==
/// Key-value store held entirely in process memory.
///
/// Expired entries are never returned; they are dropped lazily on access
/// and in bulk by [`purge_expired`](Self::purge_expired).
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Purge Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of live entries.
    pub async fn len(&self) -> usize {
        let now = current_timestamp_ms();
        let entries = self.entries.lock().await;
        entries.values().filter(|e| !e.is_expired_at(now)).count()
    }

    /// Returns true if no live entries remain.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Absolute expiry of a live entry, in ms since the epoch.
    #[cfg(test)]
    pub(crate) async fn expires_at(&self, key: &str) -> Option<u64> {
        let mut entries = self.entries.lock().await;
        live_entry(&mut entries, key).and_then(|e| e.expires_at)
    }
}

/// Looks up `key`, dropping it first if it has expired.
fn live_entry<'a>(
    entries: &'a mut HashMap<String, StoredEntry>,
    key: &str,
) -> Option<&'a mut StoredEntry> {
    if entries.get(key).is_some_and(StoredEntry::is_expired) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

/// INCR semantics: missing keys start at 0, non-integers are rejected.
fn increment_entry(entries: &mut HashMap<String, StoredEntry>, key: &str) -> Result<i64> {
    match live_entry(entries, key) {
        Some(entry) => {
            let current: i64 = entry.value.parse().map_err(|_| {
                CacheError::Command(format!("value at '{}' is not an integer", key))
            })?;
            let next = current.checked_add(1).ok_or_else(|| {
                CacheError::Command(format!("increment at '{}' would overflow", key))
            })?;
            entry.value = next.to_string();
            Ok(next)
        }
        None => {
            entries.insert(key.to_string(), StoredEntry::new("1".to_string(), None));
            Ok(1)
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    async fn ping(&self) -> Result<bool> {
        Ok(true)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        Ok(live_entry(&mut entries, key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), StoredEntry::new(value.to_string(), None));
        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        // Same floor as SETEX against Redis: a zero TTL still lives one second
        let ttl_secs = ttl_secs.max(1);
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            StoredEntry::new(value.to_string(), Some(ttl_secs)),
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        Ok(entries
            .remove(key)
            .is_some_and(|entry| !entry.is_expired()))
    }

    async fn increment(&self, key: &str) -> Result<i64> {
        let mut entries = self.entries.lock().await;
        increment_entry(&mut entries, key)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        match live_entry(&mut entries, key) {
            Some(entry) => {
                entry.expire_in(ttl_secs.max(1));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>> {
        let mut entries = self.entries.lock().await;
        Ok(live_entry(&mut entries, key).and_then(|e| e.ttl_remaining()))
    }

    async fn increment_window(&self, key: &str, window_secs: u64) -> Result<i64> {
        let mut entries = self.entries.lock().await;
        let count = increment_entry(&mut entries, key)?;
        if count == 1 {
            if let Some(entry) = entries.get_mut(key) {
                entry.expire_in(window_secs.max(1));
            }
        }
        Ok(count)
    }
}
