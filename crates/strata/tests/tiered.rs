// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for tier chain behavior.

#![cfg(feature = "memory")]

use strata::{AnyCacheExt, CacheTier, CacheTierExt, Capability, Error, Expirable, MemoryCache, TieredCache};
use strata_tier::testing::{CacheOp, MockCache};

type TestResult = Result<(), Error>;

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    futures::executor::block_on(f)
}

fn key(name: &str) -> String {
    name.to_string()
}

#[derive(Debug, Clone, PartialEq)]
struct TestObject {
    value: i32,
    expired: bool,
}

impl TestObject {
    fn fresh(value: i32) -> Self {
        Self { value, expired: false }
    }

    fn stale(value: i32) -> Self {
        Self { value, expired: true }
    }
}

impl Expirable for TestObject {
    fn has_expired(&self) -> bool {
        self.expired
    }
}

/// Tier whose purge always fails with a backend error.
#[derive(Debug, Default)]
struct BrokenPurge;

impl<V: Send + Sync> CacheTier<String, V> for BrokenPurge {
    async fn get(&self, _key: &String) -> Result<V, Error> {
        Err(Error::NotFound)
    }

    async fn set(&self, _key: &String, value: V) -> Result<V, Error> {
        Ok(value)
    }

    async fn delete(&self, _key: &String) -> Result<bool, Error> {
        Ok(false)
    }

    async fn purge(&self) -> Result<bool, Error> {
        Err(Error::backend("purge unavailable"))
    }
}

fn chain(tiers: &[&MockCache<String, i32>]) -> TieredCache<String, i32> {
    TieredCache::<String, i32>::builder()
        .tiers(tiers.iter().map(|tier| (*tier).clone().into_any()))
        .build()
}

// Reads

#[test]
fn get_falls_back_and_backfills_earlier_tier() -> TestResult {
    block_on(async {
        let l1 = MockCache::<String, i32>::new();
        let l2 = MockCache::<String, i32>::new();
        l2.set(&key("a"), 7).await?;
        l2.clear_operations();

        let cache = chain(&[&l1, &l2]);
        assert_eq!(cache.get(&key("a")).await?, 7);

        assert_eq!(l1.get(&key("a")).await?, 7);
        assert_eq!(
            l2.operations(),
            vec![CacheOp::Get(key("a")), CacheOp::Get(key("a"))],
            "the answering tier is read, then checked by backfill, never written"
        );
        Ok(())
    })
}

#[test]
fn get_prefers_first_tier() -> TestResult {
    block_on(async {
        let l1 = MockCache::<String, i32>::new();
        let l2 = MockCache::<String, i32>::new();
        l1.set(&key("a"), 1).await?;
        l2.set(&key("a"), 2).await?;

        let cache = chain(&[&l1, &l2]);
        assert_eq!(cache.get(&key("a")).await?, 1);

        // The second tier already holds the key, so backfill leaves it alone.
        assert_eq!(l2.get(&key("a")).await?, 2);
        Ok(())
    })
}

#[test]
fn get_backfills_later_tiers_too() -> TestResult {
    block_on(async {
        let l1 = MockCache::<String, i32>::new();
        let l2 = MockCache::<String, i32>::new();
        let l3 = MockCache::<String, i32>::new();
        l2.set(&key("a"), 5).await?;

        let cache = chain(&[&l1, &l2, &l3]);
        assert_eq!(cache.get(&key("a")).await?, 5);

        assert!(l1.contains_key(&key("a")));
        assert!(l3.contains_key(&key("a")));
        Ok(())
    })
}

#[test]
fn get_from_last_of_three_tiers_backfills_both_earlier_tiers() -> TestResult {
    block_on(async {
        let a = MockCache::<String, i32>::new();
        let b = MockCache::<String, i32>::new();
        let c = MockCache::<String, i32>::new();
        c.set(&key("test"), 8).await?;
        c.clear_operations();

        let cache = chain(&[&a, &b, &c]);
        assert_eq!(cache.get(&key("test")).await?, 8);

        let backfilled = vec![
            CacheOp::Get(key("test")),
            CacheOp::Get(key("test")),
            CacheOp::Set {
                key: key("test"),
                value: 8,
            },
        ];
        assert_eq!(a.operations(), backfilled);
        assert_eq!(b.operations(), backfilled);
        assert_eq!(
            c.operations(),
            vec![CacheOp::Get(key("test")), CacheOp::Get(key("test"))],
            "the tier that answered is never written"
        );
        Ok(())
    })
}

#[test]
fn get_replaces_expired_copy_during_backfill() -> TestResult {
    block_on(async {
        let l1 = MemoryCache::<String, TestObject>::new();
        let l2 = MemoryCache::<String, TestObject>::new();
        l1.set(&key("a"), TestObject::stale(1)).await?;
        l2.set(&key("a"), TestObject::fresh(2)).await?;

        let cache = TieredCache::<String, TestObject>::builder()
            .tier(l1.clone())
            .tier(l2)
            .build();

        assert_eq!(cache.get(&key("a")).await?, TestObject::fresh(2));
        assert_eq!(l1.get(&key("a")).await?, TestObject::fresh(2));
        Ok(())
    })
}

#[test]
fn get_surfaces_error_of_last_tier() {
    block_on(async {
        let failing = MockCache::<String, i32>::new();
        failing.fail_when(|op| matches!(op, CacheOp::Get(_)));
        let empty = MockCache::<String, i32>::new();

        let cache = chain(&[&failing, &empty]);
        let error = cache.get(&key("a")).await.expect_err("no tier holds the key");
        assert!(error.is_not_found());

        let cache = chain(&[&empty, &failing]);
        let error = cache.get(&key("a")).await.expect_err("no tier holds the key");
        assert!(matches!(error, Error::Backend(_)));
    });
}

#[test]
fn get_surfaces_expired_from_last_tier() {
    block_on(async {
        let empty = MemoryCache::<String, TestObject>::new();
        let stale = MemoryCache::<String, TestObject>::new();
        stale.set(&key("a"), TestObject::stale(1)).await.expect("set failed");

        let cache = TieredCache::<String, TestObject>::builder()
            .tier(empty)
            .tier(stale)
            .build();

        assert!(cache.get(&key("a")).await.expect_err("value expired").is_expired());
    });
}

#[test]
fn get_succeeds_when_backfill_fails() -> TestResult {
    block_on(async {
        let l1 = MockCache::<String, i32>::new();
        l1.fail_when(|op| matches!(op, CacheOp::Set { .. }));
        let l2 = MockCache::<String, i32>::new();
        l2.set(&key("a"), 3).await?;

        let cache = chain(&[&l1, &l2]);
        assert_eq!(cache.get(&key("a")).await?, 3);
        assert!(!l1.contains_key(&key("a")));
        Ok(())
    })
}

#[test]
fn has_follows_get() -> TestResult {
    block_on(async {
        let l1 = MockCache::<String, i32>::new();
        let l2 = MockCache::<String, i32>::new();
        l2.set(&key("a"), 1).await?;

        let cache = chain(&[&l1, &l2]);
        assert!(cache.has(&key("a")).await);
        assert!(!cache.has(&key("b")).await);
        Ok(())
    })
}

// Writes

#[test]
fn set_writes_every_tier_and_echoes_value() -> TestResult {
    block_on(async {
        let l1 = MockCache::<String, i32>::new();
        let l2 = MockCache::<String, i32>::new();

        let cache = chain(&[&l1, &l2]);
        assert_eq!(cache.set(&key("a"), 9).await?, 9);

        assert_eq!(l1.get(&key("a")).await?, 9);
        assert_eq!(l2.get(&key("a")).await?, 9);
        Ok(())
    })
}

#[test]
fn set_stops_at_first_failure() {
    block_on(async {
        let l1 = MockCache::<String, i32>::new();
        let l2 = MockCache::<String, i32>::new();
        l2.fail_when(|op| matches!(op, CacheOp::Set { .. }));
        let l3 = MockCache::<String, i32>::new();

        let cache = chain(&[&l1, &l2, &l3]);
        let error = cache.set(&key("a"), 1).await.expect_err("second tier fails");
        assert!(matches!(error, Error::Backend(_)));

        assert!(l1.contains_key(&key("a")), "earlier writes are kept");
        assert!(l3.operations().is_empty(), "later tiers are not attempted");
    });
}

#[test]
fn delete_reports_whether_any_tier_removed_entry() -> TestResult {
    block_on(async {
        let l1 = MockCache::<String, i32>::new();
        let l2 = MockCache::<String, i32>::new();
        l2.set(&key("a"), 1).await?;

        let cache = chain(&[&l1, &l2]);
        assert!(cache.delete(&key("a")).await?);
        assert!(!l2.contains_key(&key("a")));

        assert!(!cache.delete(&key("a")).await?);
        Ok(())
    })
}

#[test]
fn delete_is_true_when_only_last_of_three_tiers_held_key() -> TestResult {
    block_on(async {
        let a = MockCache::<String, i32>::new();
        let b = MockCache::<String, i32>::new();
        let c = MockCache::<String, i32>::new();
        c.set(&key("test"), 1).await?;
        c.clear_operations();

        let cache = chain(&[&a, &b, &c]);
        assert!(cache.delete(&key("test")).await?);

        for tier in [&a, &b, &c] {
            assert_eq!(tier.operations(), vec![CacheOp::Delete(key("test"))]);
            assert!(!tier.contains_key(&key("test")));
        }

        // Each tier on its own now reports that nothing was removed.
        assert!(!a.delete(&key("test")).await?);
        assert!(!b.delete(&key("test")).await?);
        assert!(!cache.delete(&key("test")).await?);
        Ok(())
    })
}

#[test]
fn delete_stops_at_first_failure() {
    block_on(async {
        let l1 = MockCache::<String, i32>::new();
        let l2 = MockCache::<String, i32>::new();
        l2.fail_when(|op| matches!(op, CacheOp::Delete(_)));
        let l3 = MockCache::<String, i32>::new();

        let cache = chain(&[&l1, &l2, &l3]);
        let error = cache.delete(&key("a")).await.expect_err("second tier fails");
        assert!(matches!(error, Error::Backend(_)));
        assert_eq!(l1.operations(), vec![CacheOp::Delete(key("a"))]);
        assert!(l3.operations().is_empty());
    });
}

// Purge and capabilities

#[test]
fn purge_skips_tiers_without_purge_support() -> TestResult {
    block_on(async {
        let memory = MemoryCache::<String, i32>::new();
        let cache = TieredCache::<String, i32>::builder()
            .tier(memory.clone())
            .tier(MockCache::<String, i32>::new())
            .build();

        // The mock cannot purge, so the memory tier's answer stands.
        memory.set(&key("a"), 1).await?;
        assert!(!cache.purge().await?);
        Ok(())
    })
}

#[test]
fn purge_returns_result_of_last_successful_tier() -> TestResult {
    block_on(async {
        let stale = MemoryCache::<String, TestObject>::new();
        let fresh = MemoryCache::<String, TestObject>::new();
        stale.set(&key("a"), TestObject::stale(1)).await?;
        fresh.set(&key("a"), TestObject::fresh(1)).await?;

        let cache = TieredCache::<String, TestObject>::builder()
            .tier(stale.clone())
            .tier(fresh.clone())
            .build();
        assert!(!cache.purge().await?, "the last tier had nothing to purge");
        assert_eq!(stale.count().await?, 0);

        stale.set(&key("b"), TestObject::stale(2)).await?;
        let cache = TieredCache::<String, TestObject>::builder()
            .tier(fresh)
            .tier(stale.clone())
            .build();
        assert!(cache.purge().await?);
        assert_eq!(stale.count().await?, 0);
        Ok(())
    })
}

#[test]
fn purge_keeps_previous_result_when_tier_fails() -> TestResult {
    block_on(async {
        let memory = MemoryCache::<String, TestObject>::new();
        let cache = TieredCache::<String, TestObject>::builder()
            .tier(MockCache::<String, TestObject>::new())
            .tier(memory.clone())
            .tier(BrokenPurge)
            .tier(MockCache::<String, TestObject>::new())
            .build();

        memory.set(&key("a"), TestObject::stale(1)).await?;
        assert!(cache.purge().await?);
        Ok(())
    })
}

#[test]
fn purge_of_unsupported_tiers_only_is_false() -> TestResult {
    block_on(async {
        let cache = TieredCache::<String, i32>::builder()
            .tier(BrokenPurge)
            .tier(MockCache::<String, i32>::new())
            .build();

        assert!(!cache.purge().await?);
        Ok(())
    })
}

#[test]
fn purge_removes_expired_entries_from_every_tier() -> TestResult {
    block_on(async {
        let l1 = MemoryCache::<String, TestObject>::with_limit(10);
        let l2 = MemoryCache::<String, TestObject>::new();
        let cache = TieredCache::<String, TestObject>::builder()
            .tier(l1.clone())
            .tier(l2.clone())
            .build();

        for (name, value) in [("a", 1), ("b", 2), ("c", 3)] {
            cache.set(&key(name), TestObject::stale(value)).await?;
        }
        cache.set(&key("d"), TestObject::fresh(4)).await?;

        assert!(cache.purge().await?);
        assert_eq!(l1.count().await?, 1);
        assert_eq!(l2.count().await?, 1);
        assert_eq!(cache.get(&key("d")).await?, TestObject::fresh(4));
        Ok(())
    })
}

#[test]
fn chain_reports_no_count_and_no_limit() {
    block_on(async {
        let cache = TieredCache::<String, i32>::builder().memory(10).build();

        assert!(matches!(
            cache.count().await,
            Err(Error::NotImplemented(Capability::Count))
        ));
        assert_eq!(cache.limit(), 0);
    });
}

// Composition

#[test]
fn chains_nest() -> TestResult {
    block_on(async {
        let outer_l1 = MockCache::<String, i32>::new();
        let inner_l1 = MockCache::<String, i32>::new();
        let inner_l2 = MockCache::<String, i32>::new();
        inner_l2.set(&key("a"), 11).await?;

        let inner = chain(&[&inner_l1, &inner_l2]);
        let outer = TieredCache::<String, i32>::builder()
            .tier(outer_l1.clone())
            .tier(inner.into_tier())
            .build();

        assert_eq!(outer.get(&key("a")).await?, 11);
        assert!(outer_l1.contains_key(&key("a")));
        assert!(inner_l1.contains_key(&key("a")));
        Ok(())
    })
}

#[test]
fn clones_share_tiers() -> TestResult {
    block_on(async {
        let l1 = MockCache::<String, i32>::new();
        let cache = chain(&[&l1]);
        let clone = cache.clone();

        cache.set(&key("a"), 1).await?;
        assert_eq!(clone.get(&key("a")).await?, 1);
        assert_eq!(clone.tiers().len(), 1);
        Ok(())
    })
}

#[test]
fn new_matches_builder_defaults() -> TestResult {
    block_on(async {
        let l1 = MockCache::<String, i32>::new();
        let cache = TieredCache::new(vec![l1.clone().into_any()]);

        assert_eq!(cache.name(), "strata");
        cache.set(&key("a"), 1).await?;
        assert!(l1.contains_key(&key("a")));
        Ok(())
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_access_keeps_tiers_bounded() {
    let l1 = MemoryCache::<u32, u32>::with_limit(16);
    let l2 = MemoryCache::<u32, u32>::with_limit(64);
    let cache = TieredCache::<u32, u32>::builder().tier(l1.clone()).tier(l2.clone()).build();

    let mut handles = Vec::new();
    for worker in 0..8_u32 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..100 {
                let k = worker * 1_000 + i;
                cache.set(&k, k).await.expect("set failed");
                if let Ok(value) = cache.get(&k).await {
                    assert_eq!(value, k);
                }
                let _ = cache.delete(&(k / 3)).await;
            }
        }));
    }

    for handle in handles {
        handle.await.expect("worker panicked");
    }

    assert!(l1.len() <= 16);
    assert!(l2.len() <= 64);
}
