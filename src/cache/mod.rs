//! Cache Module
//!
//! Domain-scoped JSON caching over a key-value store, with per-domain TTLs
//! and a degraded-mode policy that never lets a store failure reach callers.

mod domain;
mod facade;
mod key;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use domain::{CacheDomain, TtlPolicy};
pub use facade::{CacheFacade, StoreHealth};
pub use key::QueryKey;
pub use stats::{CacheStats, StatsSnapshot};
