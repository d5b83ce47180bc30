//! Cache Domains
//!
//! Table of booking domains with their key prefix and default TTL.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CacheError;

// == Cache Domain ==
/// A family of cached values sharing a key prefix and a default lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheDomain {
    Search,
    Session,
    Flights,
    Hotels,
    Tours,
    Popular,
}

impl CacheDomain {
    /// Every domain, in table order.
    pub const ALL: [CacheDomain; 6] = [
        CacheDomain::Search,
        CacheDomain::Session,
        CacheDomain::Flights,
        CacheDomain::Hotels,
        CacheDomain::Tours,
        CacheDomain::Popular,
    ];

    /// Short name used in routes and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            CacheDomain::Search => "search",
            CacheDomain::Session => "session",
            CacheDomain::Flights => "flights",
            CacheDomain::Hotels => "hotels",
            CacheDomain::Tours => "tours",
            CacheDomain::Popular => "popular",
        }
    }

    /// Key prefix in the store.
    pub fn prefix(self) -> &'static str {
        match self {
            CacheDomain::Session => "session:user",
            other => other.as_str(),
        }
    }

    /// Default lifetime in seconds.
    pub fn default_ttl(self) -> u64 {
        match self {
            CacheDomain::Search => 300,
            CacheDomain::Session => 86_400,
            CacheDomain::Flights => 600,
            CacheDomain::Hotels => 1_800,
            CacheDomain::Tours => 3_600,
            CacheDomain::Popular => 7_200,
        }
    }

    /// Whether values live in the dedicated session store.
    pub fn uses_session_store(self) -> bool {
        self == CacheDomain::Session
    }

    /// Full store key: `"{prefix}:{suffix}"`.
    pub fn key(self, suffix: &str) -> String {
        format!("{}:{}", self.prefix(), suffix)
    }
}

impl fmt::Display for CacheDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheDomain {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheDomain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| CacheError::InvalidRequest(format!("Unknown cache domain '{}'", s)))
    }
}

// == TTL Policy ==
/// Per-domain TTL table, seeded with the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    ttls: [u64; CacheDomain::ALL.len()],
}

impl TtlPolicy {
    /// Overrides the TTL of one domain.
    pub fn with_ttl(mut self, domain: CacheDomain, ttl_secs: u64) -> Self {
        self.ttls[domain as usize] = ttl_secs;
        self
    }

    /// TTL in seconds for `domain`.
    pub fn ttl_for(&self, domain: CacheDomain) -> u64 {
        self.ttls[domain as usize]
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            ttls: CacheDomain::ALL.map(CacheDomain::default_ttl),
        }
    }
}
