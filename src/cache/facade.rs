//! Cache Facade Module
//!
//! Typed, domain-scoped caching over injected key-value stores. The
//! `try_*` layer reports store failures as `CacheError`; the public layer
//! applies the degraded-mode policy: reads fall back to `None`, writes to
//! `false`, and the failure is logged.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{CacheDomain, CacheStats, StatsSnapshot, TtlPolicy};
use crate::error::Result;
use crate::store::KeyValueStore;

/// Reachability of the two backing stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreHealth {
    pub cache: bool,
    pub session: bool,
}

impl StoreHealth {
    pub fn is_healthy(&self) -> bool {
        self.cache && self.session
    }
}

// == Cache Facade ==
/// Domain-oriented cache over a general store and a session store.
#[derive(Debug)]
pub struct CacheFacade {
    store: Arc<dyn KeyValueStore>,
    session_store: Arc<dyn KeyValueStore>,
    ttls: TtlPolicy,
    stats: CacheStats,
}

impl CacheFacade {
    // == Constructor ==
    /// Creates a facade over `store` for general caching and
    /// `session_store` for user sessions.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        session_store: Arc<dyn KeyValueStore>,
        ttls: TtlPolicy,
    ) -> Self {
        Self {
            store,
            session_store,
            ttls,
            stats: CacheStats::new(),
        }
    }

    /// Uses one store for everything, sessions included.
    pub fn single(store: Arc<dyn KeyValueStore>, ttls: TtlPolicy) -> Self {
        Self::new(store.clone(), store, ttls)
    }

    pub fn ttls(&self) -> &TtlPolicy {
        &self.ttls
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn store_for(&self, domain: CacheDomain) -> &dyn KeyValueStore {
        if domain.uses_session_store() {
            self.session_store.as_ref()
        } else {
            self.store.as_ref()
        }
    }

    // == Lifecycle ==
    /// Connects both stores eagerly.
    pub async fn connect(&self) -> Result<()> {
        self.store.connect().await?;
        self.session_store.connect().await
    }

    /// Disconnects both stores.
    pub async fn disconnect(&self) -> Result<()> {
        self.store.disconnect().await?;
        self.session_store.disconnect().await
    }

    /// Pings both stores. An erroring store counts as unreachable.
    pub async fn ping(&self) -> StoreHealth {
        let cache = self.store.ping().await.unwrap_or_else(|e| {
            warn!("Cache store ping failed: {}", e);
            false
        });
        let session = self.session_store.ping().await.unwrap_or_else(|e| {
            warn!("Session store ping failed: {}", e);
            false
        });
        StoreHealth { cache, session }
    }

    // == Fallible Layer ==
    async fn try_get_in(&self, store: &dyn KeyValueStore, key: &str) -> Result<Option<String>> {
        store.get(key).await
    }

    async fn try_set_in(
        &self,
        store: &dyn KeyValueStore,
        key: &str,
        value: &str,
        ttl: Option<u64>,
    ) -> Result<()> {
        match ttl {
            Some(ttl) => store.set_with_expiry(key, value, ttl).await,
            None => store.set(key, value).await,
        }
    }

    async fn try_get_json_in<T: DeserializeOwned>(
        &self,
        store: &dyn KeyValueStore,
        key: &str,
    ) -> Result<Option<T>> {
        match self.try_get_in(store, key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn try_set_json_in<T: Serialize + ?Sized>(
        &self,
        store: &dyn KeyValueStore,
        key: &str,
        value: &T,
        ttl: Option<u64>,
    ) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.try_set_in(store, key, &raw, ttl).await
    }

    /// Raw read from the general store.
    pub async fn try_get(&self, key: &str) -> Result<Option<String>> {
        self.try_get_in(self.store.as_ref(), key).await
    }

    /// Raw write to the general store; no expiry when `ttl` is None.
    pub async fn try_set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        self.try_set_in(self.store.as_ref(), key, value, ttl).await
    }

    /// Delete from the general store.
    pub async fn try_del(&self, key: &str) -> Result<bool> {
        self.store.delete(key).await
    }

    /// Typed read; undecodable values are a `Serialization` error here.
    pub async fn try_get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.try_get_json_in(self.store.as_ref(), key).await
    }

    /// Typed write.
    pub async fn try_set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<u64>,
    ) -> Result<()> {
        self.try_set_json_in(self.store.as_ref(), key, value, ttl)
            .await
    }

    // == Degraded-Mode Policy ==
    fn read_outcome<T>(&self, key: &str, result: Result<Option<T>>) -> Option<T> {
        match result {
            Ok(Some(value)) => {
                debug!("Cache hit: {}", key);
                self.stats.record_hit();
                Some(value)
            }
            Ok(None) => {
                debug!("Cache miss: {}", key);
                self.stats.record_miss();
                None
            }
            Err(e) => {
                warn!("Cache read for '{}' treated as miss: {}", key, e);
                self.stats.record_miss();
                self.stats.record_error();
                None
            }
        }
    }

    fn write_outcome(&self, key: &str, result: Result<()>) -> bool {
        match result {
            Ok(()) => {
                self.stats.record_write();
                true
            }
            Err(e) => {
                warn!("Cache write for '{}' skipped: {}", key, e);
                self.stats.record_error();
                false
            }
        }
    }

    fn delete_outcome(&self, key: &str, result: Result<bool>) -> bool {
        match result {
            Ok(_) => {
                self.stats.record_delete();
                true
            }
            Err(e) => {
                warn!("Cache delete for '{}' failed: {}", key, e);
                self.stats.record_error();
                false
            }
        }
    }

    // == Raw Operations ==
    /// Fetches the raw value, or None on miss or store error.
    pub async fn get(&self, key: &str) -> Option<String> {
        let result = self.try_get(key).await;
        self.read_outcome(key, result)
    }

    /// Stores a raw value. Returns false on store error.
    pub async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> bool {
        let result = self.try_set(key, value, ttl).await;
        self.write_outcome(key, result)
    }

    /// Deletes a key. Returns false only on store error.
    pub async fn del(&self, key: &str) -> bool {
        let result = self.try_del(key).await;
        self.delete_outcome(key, result)
    }

    /// Fetches and decodes a JSON value; decode failures count as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let result = self.try_get_json(key).await;
        self.read_outcome(key, result)
    }

    /// Encodes and stores a JSON value.
    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<u64>,
    ) -> bool {
        let result = self.try_set_json(key, value, ttl).await;
        self.write_outcome(key, result)
    }

    // == Domain Operations ==
    /// Caches `value` under `domain`/`suffix` with the domain TTL unless
    /// `ttl` overrides it.
    pub async fn cache_for<T: Serialize + ?Sized>(
        &self,
        domain: CacheDomain,
        suffix: &str,
        value: &T,
        ttl: Option<u64>,
    ) -> bool {
        let key = domain.key(suffix);
        let ttl = ttl.unwrap_or_else(|| self.ttls.ttl_for(domain));
        let result = self
            .try_set_json_in(self.store_for(domain), &key, value, Some(ttl))
            .await;
        self.write_outcome(&key, result)
    }

    /// Reads the value cached under `domain`/`suffix`.
    pub async fn get_for<T: DeserializeOwned>(
        &self,
        domain: CacheDomain,
        suffix: &str,
    ) -> Option<T> {
        let key = domain.key(suffix);
        let result = self.try_get_json_in(self.store_for(domain), &key).await;
        self.read_outcome(&key, result)
    }

    /// Removes the value cached under `domain`/`suffix`.
    pub async fn clear_for(&self, domain: CacheDomain, suffix: &str) -> bool {
        let key = domain.key(suffix);
        let result = self.store_for(domain).delete(&key).await;
        self.delete_outcome(&key, result)
    }

    // == Convenience Wrappers ==
    /// Caches search results under `search:<query>` (default 5 minutes).
    pub async fn cache_search_results<T: Serialize + ?Sized>(
        &self,
        query: &str,
        results: &T,
        ttl: Option<u64>,
    ) -> bool {
        self.cache_for(CacheDomain::Search, query, results, ttl).await
    }

    /// Cached search results for `query`, if any.
    pub async fn get_search_results<T: DeserializeOwned>(&self, query: &str) -> Option<T> {
        self.get_for(CacheDomain::Search, query).await
    }

    /// Stores a user's session in the session store (default 24 hours).
    pub async fn cache_user_session<T: Serialize + ?Sized>(
        &self,
        user_id: &str,
        session: &T,
        ttl: Option<u64>,
    ) -> bool {
        self.cache_for(CacheDomain::Session, user_id, session, ttl)
            .await
    }

    /// Cached session for `user_id`.
    pub async fn get_user_session<T: DeserializeOwned>(&self, user_id: &str) -> Option<T> {
        self.get_for(CacheDomain::Session, user_id).await
    }

    /// Drops a user's session, e.g. on logout.
    pub async fn clear_user_session(&self, user_id: &str) -> bool {
        self.clear_for(CacheDomain::Session, user_id).await
    }

    /// Caches flight offers for a route query (default 10 minutes).
    pub async fn cache_flight_results<T: Serialize + ?Sized>(
        &self,
        query: &str,
        results: &T,
        ttl: Option<u64>,
    ) -> bool {
        self.cache_for(CacheDomain::Flights, query, results, ttl)
            .await
    }

    /// Cached flight offers for `query`.
    pub async fn get_flight_results<T: DeserializeOwned>(&self, query: &str) -> Option<T> {
        self.get_for(CacheDomain::Flights, query).await
    }

    /// Caches hotel availability (default 30 minutes).
    pub async fn cache_hotel_results<T: Serialize + ?Sized>(
        &self,
        query: &str,
        results: &T,
        ttl: Option<u64>,
    ) -> bool {
        self.cache_for(CacheDomain::Hotels, query, results, ttl).await
    }

    /// Cached hotel availability for `query`.
    pub async fn get_hotel_results<T: DeserializeOwned>(&self, query: &str) -> Option<T> {
        self.get_for(CacheDomain::Hotels, query).await
    }

    /// Caches tour listings (default 1 hour).
    pub async fn cache_tour_results<T: Serialize + ?Sized>(
        &self,
        query: &str,
        results: &T,
        ttl: Option<u64>,
    ) -> bool {
        self.cache_for(CacheDomain::Tours, query, results, ttl).await
    }

    /// Cached tour listings for `query`.
    pub async fn get_tour_results<T: DeserializeOwned>(&self, query: &str) -> Option<T> {
        self.get_for(CacheDomain::Tours, query).await
    }

    /// Caches a popular-searches list keyed by `kind`, e.g. `weekly`
    /// (default 2 hours).
    pub async fn cache_popular_searches<T: Serialize + ?Sized>(
        &self,
        kind: &str,
        searches: &T,
        ttl: Option<u64>,
    ) -> bool {
        self.cache_for(CacheDomain::Popular, kind, searches, ttl)
            .await
    }

    /// Cached popular-searches list for `kind`.
    pub async fn get_popular_searches<T: DeserializeOwned>(&self, kind: &str) -> Option<T> {
        self.get_for(CacheDomain::Popular, kind).await
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde::Deserialize;
    use serde_json::json;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Flight {
        code: String,
        price: u32,
    }

    fn flights() -> Vec<Flight> {
        vec![
            Flight {
                code: "BA117".to_string(),
                price: 420,
            },
            Flight {
                code: "AA100".to_string(),
                price: 389,
            },
        ]
    }

    fn facade() -> (CacheFacade, Arc<MemoryStore>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let sessions = Arc::new(MemoryStore::new());
        let facade = CacheFacade::new(store.clone(), sessions.clone(), TtlPolicy::default());
        (facade, store, sessions)
    }

    #[tokio::test]
    async fn test_raw_set_and_get() {
        let (cache, _, _) = facade();

        assert!(cache.set("raw", "value", Some(60)).await);
        assert_eq!(cache.get("raw").await.as_deref(), Some("value"));
    }

    #[tokio::test]
    async fn test_set_without_ttl_never_expires() {
        let (cache, store, _) = facade();

        assert!(cache.set("forever", "value", None).await);
        assert_eq!(store.ttl("forever").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_json_roundtrip() {
        let (cache, _, _) = facade();

        assert!(cache.set_json("flights", &flights(), Some(60)).await);
        let cached: Option<Vec<Flight>> = cache.get_json("flights").await;
        assert_eq!(cached, Some(flights()));
    }

    #[tokio::test]
    async fn test_miss_on_absent() {
        let (cache, _, _) = facade();

        let cached: Option<Vec<Flight>> = cache.get_json("never-written").await;
        assert!(cached.is_none());
        assert!(cache.get("never-written").await.is_none());
    }

    #[tokio::test]
    async fn test_delete_then_miss() {
        let (cache, _, _) = facade();

        cache.set_json("k", &json!({"a": 1}), None).await;
        assert!(cache.del("k").await);

        let cached: Option<serde_json::Value> = cache.get_json("k").await;
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_miss() {
        let (cache, store, _) = facade();

        store.set("corrupt", "{not json").await.unwrap();

        let cached: Option<Vec<Flight>> = cache.get_json("corrupt").await;
        assert!(cached.is_none());
        assert!(cache.try_get_json::<Vec<Flight>>("corrupt").await.is_err());
        assert_eq!(cache.stats().errors, 1);
    }

    #[tokio::test]
    async fn test_incompatible_shape_is_a_miss() {
        let (cache, _, _) = facade();

        cache.set_json("shape", &json!({"unexpected": true}), None).await;
        let cached: Option<Vec<Flight>> = cache.get_json("shape").await;
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_domain_isolation() {
        let (cache, _, _) = facade();

        assert!(cache.cache_flight_results("X", &flights(), None).await);

        let hotels: Option<Vec<Flight>> = cache.get_hotel_results("X").await;
        assert!(hotels.is_none());

        let cached: Option<Vec<Flight>> = cache.get_flight_results("X").await;
        assert_eq!(cached, Some(flights()));
    }

    #[tokio::test]
    async fn test_domain_default_ttl_applied() {
        let (cache, store, _) = facade();

        cache.cache_tour_results("lisbon", &json!([]), None).await;
        let ttl = store.ttl("tours:lisbon").await.unwrap().unwrap();
        assert!(ttl <= 3_600 && ttl > 3_590);
    }

    #[tokio::test]
    async fn test_domain_ttl_override_per_call() {
        let (cache, store, _) = facade();

        cache.cache_hotel_results("porto", &json!([]), Some(5)).await;
        let ttl = store.ttl("hotels:porto").await.unwrap().unwrap();
        assert!(ttl <= 5);
    }

    #[tokio::test]
    async fn test_configured_ttl_applied() {
        let store = Arc::new(MemoryStore::new());
        let ttls = TtlPolicy::default().with_ttl(CacheDomain::Popular, 10);
        let cache = CacheFacade::single(store.clone(), ttls);

        cache.cache_popular_searches("weekly", &json!(["rome"]), None).await;
        let ttl = store.ttl("popular:weekly").await.unwrap().unwrap();
        assert!(ttl <= 10);
    }

    #[tokio::test]
    async fn test_zero_ttl_still_caches_on_memory_store() {
        let store = Arc::new(MemoryStore::new());
        let ttls = TtlPolicy::default().with_ttl(CacheDomain::Hotels, 0);
        let cache = CacheFacade::single(store.clone(), ttls);

        assert!(cache.set_json("k", &1u32, Some(0)).await);
        assert_eq!(cache.get_json::<u32>("k").await, Some(1));

        assert!(cache.cache_hotel_results("rome", &json!([1]), None).await);
        assert_eq!(
            cache.get_hotel_results::<serde_json::Value>("rome").await,
            Some(json!([1]))
        );
        assert_eq!(store.ttl("hotels:rome").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_sessions_use_session_store() {
        let (cache, store, sessions) = facade();

        let session = json!({"user": "42", "currency": "EUR"});
        assert!(cache.cache_user_session("42", &session, None).await);

        assert!(store.get("session:user:42").await.unwrap().is_none());
        assert!(sessions.get("session:user:42").await.unwrap().is_some());

        let cached: Option<serde_json::Value> = cache.get_user_session("42").await;
        assert_eq!(cached, Some(session));

        assert!(cache.clear_user_session("42").await);
        let cached: Option<serde_json::Value> = cache.get_user_session("42").await;
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_search_and_popular_wrappers() {
        let (cache, _, _) = facade();

        cache.cache_search_results("q=rome", &json!([1, 2]), None).await;
        cache.cache_popular_searches("daily", &json!(["rome"]), None).await;

        let search: Option<Vec<u32>> = cache.get_search_results("q=rome").await;
        let popular: Option<Vec<String>> = cache.get_popular_searches("daily").await;
        assert_eq!(search, Some(vec![1, 2]));
        assert_eq!(popular, Some(vec!["rome".to_string()]));
    }

    #[tokio::test]
    async fn test_set_overwrites_and_resets_ttl() {
        let (cache, _, _) = facade();

        cache.set_json("k", &1, Some(1)).await;
        cache.set_json("k", &2, Some(60)).await;

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(cache.get_json::<u32>("k").await, Some(2));
    }

    #[tokio::test]
    async fn test_stats_track_hits_and_misses() {
        let (cache, _, _) = facade();

        cache.set_json("k", &1, None).await;
        cache.get_json::<u32>("k").await;
        cache.get_json::<u32>("missing").await;

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.writes, 1);
    }

    #[tokio::test]
    async fn test_ping_both_stores() {
        let (cache, _, _) = facade();
        assert!(cache.ping().await.is_healthy());
    }
}
