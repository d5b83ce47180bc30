//! Property-Based Tests for the Cache Module
//!
//! Uses proptest to check facade and limiter behaviour over generated
//! keys, values and limits. Async code is driven with `tokio_test::block_on`.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::{CacheDomain, CacheFacade, QueryKey, TtlPolicy};
use crate::rate_limit::RateLimiter;
use crate::store::MemoryStore;

// == Strategies ==
fn suffix_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_=&-]{1,48}"
}

fn domain_strategy() -> impl Strategy<Value = CacheDomain> {
    prop::sample::select(CacheDomain::ALL.to_vec())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Offer {
    id: u32,
    title: String,
    price_cents: u64,
    tags: Vec<String>,
    extras: BTreeMap<String, bool>,
}

fn offer_strategy() -> impl Strategy<Value = Offer> {
    (
        any::<u32>(),
        ".{0,40}",
        any::<u64>(),
        prop::collection::vec("[a-z]{1,8}", 0..5),
        prop::collection::btree_map("[a-z]{1,6}", any::<bool>(), 0..4),
    )
        .prop_map(|(id, title, price_cents, tags, extras)| Offer {
            id,
            title,
            price_cents,
            tags,
            extras,
        })
}

fn facade() -> CacheFacade {
    CacheFacade::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
        TtlPolicy::default(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Storing a value and reading it back before expiry yields the same value.
    #[test]
    fn prop_json_roundtrip(
        key in suffix_strategy(),
        offers in prop::collection::vec(offer_strategy(), 0..6),
        ttl in 1u64..86_400,
    ) {
        let cache = facade();
        let cached: Option<Vec<Offer>> = tokio_test::block_on(async {
            assert!(cache.set_json(&key, &offers, Some(ttl)).await);
            cache.get_json(&key).await
        });
        prop_assert_eq!(cached, Some(offers));
    }

    // A write in one domain is never visible from another with the same suffix.
    #[test]
    fn prop_domain_isolation(
        suffix in suffix_strategy(),
        written in domain_strategy(),
        read in domain_strategy(),
        offer in offer_strategy(),
    ) {
        let cache = facade();
        let cached: Option<Offer> = tokio_test::block_on(async {
            cache.cache_for(written, &suffix, &offer, None).await;
            cache.get_for(read, &suffix).await
        });

        if written == read {
            prop_assert_eq!(cached, Some(offer));
        } else {
            prop_assert!(cached.is_none());
        }
    }

    // Deleting a key makes every later read a miss.
    #[test]
    fn prop_delete_then_miss(suffix in suffix_strategy(), domain in domain_strategy()) {
        let cache = facade();
        let cached: Option<u32> = tokio_test::block_on(async {
            cache.cache_for(domain, &suffix, &7u32, None).await;
            assert!(cache.clear_for(domain, &suffix).await);
            cache.get_for(domain, &suffix).await
        });
        prop_assert!(cached.is_none());
    }

    // N checks within a window are allowed with remaining N-1..0; the next is denied.
    #[test]
    fn prop_rate_limiter_monotonic(limit in 1u64..40, identifier in "[a-z0-9.]{1,16}") {
        let limiter = RateLimiter::new(Arc::new(MemoryStore::new()));

        let decisions = tokio_test::block_on(async {
            let mut decisions = Vec::new();
            for _ in 0..=limit {
                decisions.push(limiter.check(&identifier, limit, 60).await);
            }
            decisions
        });

        for (i, decision) in decisions.iter().take(limit as usize).enumerate() {
            prop_assert!(decision.allowed);
            prop_assert_eq!(decision.remaining, limit - 1 - i as u64);
        }
        let last = decisions[limit as usize];
        prop_assert!(!last.allowed);
        prop_assert_eq!(last.remaining, 0);
    }

    // Parameter order never changes the rendered key.
    #[test]
    fn prop_query_key_order_independent(
        params in prop::collection::btree_map("[a-z]{1,8}", "[A-Za-z0-9]{1,8}", 0..6),
    ) {
        let forward = params
            .iter()
            .fold(QueryKey::new(), |key, (name, value)| key.param(name.clone(), value));
        let backward = params
            .iter()
            .rev()
            .fold(QueryKey::new(), |key, (name, value)| key.param(name.clone(), value));

        prop_assert_eq!(forward.build(), backward.build());
    }
}
