// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Ordered chain of cache tiers with read-through fallback and backfill.
//!
//! Tier 0 is consulted first and is usually the fastest. Reads walk the chain until a tier
//! answers, then copy the value into every tier that lacks it. Writes and deletes go to
//! every tier in order, and `purge` tolerates tiers that cannot purge.

use std::{fmt::Debug, sync::Arc, time::Duration};

use strata_tier::{AnyCache, AnyCacheExt, CacheTier, CacheTierExt, Error};
use tick::Clock;

use crate::{
    builder::TieredCacheBuilder,
    telemetry::{
        CacheActivity, CacheOperation, CacheTelemetry,
        ext::{ClockExt, system_clock},
    },
};

/// Static name identifying a cache in logs and metrics.
pub type CacheName = &'static str;

pub(crate) const DEFAULT_NAME: CacheName = "strata";

struct TieredCacheInner<K, V> {
    name: CacheName,
    tiers: Vec<AnyCache<K, V>>,
    telemetry: CacheTelemetry,
}

/// An ordered chain of cache tiers.
///
/// `TieredCache` is itself a [`CacheTier`], so a chain can be used anywhere a single tier is
/// expected, including as a tier of another chain. Its operations behave as follows:
///
/// - `get` asks each tier in order and returns the first value found. When every tier fails,
///   the error of the last tier is returned. After a hit, every tier for which `has` is `false`
///   is written with the value, including tiers after the one that answered.
/// - `set` writes each tier in order and stops at the first failure.
/// - `delete` deletes from each tier in order, stops at the first failure, and reports whether
///   any tier removed an entry.
/// - `purge` purges each tier in order. Tiers that fail, including those that do not support
///   purging, are skipped. The result is that of the last tier that purged successfully.
/// - `count` is not supported and `limit` is `0`.
///
/// Tier calls are awaited one at a time and never overlap. Dropping an operation's future
/// stops the chain; tiers already written keep their writes.
///
/// Clones share the same tiers.
///
/// # Examples
///
/// ```
/// use strata::{MemoryCache, TieredCache};
/// use strata_tier::CacheTier;
/// # futures::executor::block_on(async {
///
/// let l1 = MemoryCache::<String, i32>::with_limit(100);
/// let l2 = MemoryCache::<String, i32>::new();
/// l2.set(&"key".to_string(), 42).await?;
///
/// let cache = TieredCache::<String, i32>::builder().tier(l1.clone()).tier(l2).build();
///
/// // Served by the second tier, then copied into the first.
/// assert_eq!(cache.get(&"key".to_string()).await?, 42);
/// assert_eq!(l1.get(&"key".to_string()).await?, 42);
/// # Ok::<(), strata_tier::Error>(())
/// # });
/// ```
pub struct TieredCache<K, V> {
    inner: Arc<TieredCacheInner<K, V>>,
}

impl<K, V> Debug for TieredCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("name", &self.inner.name)
            .field("tiers", &self.inner.tiers.len())
            .finish_non_exhaustive()
    }
}

impl<K, V> Clone for TieredCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> TieredCache<K, V>
where
    K: Send + Sync + 'static,
    V: Send + 'static,
{
    /// Creates a chain from tiers ordered from first consulted to last.
    ///
    /// Telemetry is disabled and tier calls are timed with the system clock. Use
    /// [`TieredCache::builder`] to name the chain, pick a clock or enable telemetry.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::{AnyCacheExt, MemoryCache, TieredCache};
    ///
    /// let cache = TieredCache::new(vec![
    ///     MemoryCache::<u32, u32>::with_limit(10).into_any(),
    ///     MemoryCache::<u32, u32>::new().into_any(),
    /// ]);
    /// assert_eq!(cache.tiers().len(), 2);
    /// ```
    #[must_use]
    pub fn new(tiers: Vec<AnyCache<K, V>>) -> Self {
        Self::from_parts(DEFAULT_NAME, tiers, CacheTelemetry::disabled(system_clock()))
    }

    /// Creates a builder for configuring a chain.
    #[must_use]
    pub fn builder() -> TieredCacheBuilder<K, V> {
        TieredCacheBuilder::new()
    }

    pub(crate) fn from_parts(name: CacheName, tiers: Vec<AnyCache<K, V>>, telemetry: CacheTelemetry) -> Self {
        Self {
            inner: Arc::new(TieredCacheInner { name, tiers, telemetry }),
        }
    }
}

impl<K, V> TieredCache<K, V> {
    /// Returns the name used in logs and metrics.
    #[must_use]
    pub fn name(&self) -> CacheName {
        self.inner.name
    }

    /// Returns the clock used to time tier calls.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        self.inner.telemetry.clock()
    }

    /// Returns the tiers, first consulted first.
    #[must_use]
    pub fn tiers(&self) -> &[AnyCache<K, V>] {
        &self.inner.tiers
    }

    /// Converts this chain into an [`AnyCache`] so it can be nested in another chain.
    #[must_use]
    pub fn into_tier(self) -> AnyCache<K, V>
    where
        K: Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        self.into_any()
    }

    fn record(&self, operation: CacheOperation, activity: CacheActivity, tier: Option<usize>, duration: Option<Duration>) {
        self.inner.telemetry.record(self.inner.name, operation, activity, tier, duration);
    }

    /// Writes `value` into every tier that does not currently hold `key`.
    ///
    /// Write failures are recorded and otherwise ignored; the read that found the value
    /// has already succeeded.
    async fn backfill(&self, key: &K, value: &V)
    where
        K: Sync,
        V: Clone + Send + Sync,
    {
        for (index, tier) in self.inner.tiers.iter().enumerate() {
            if tier.has(key).await {
                continue;
            }

            let timed = self.clock().timed_async(tier.set(key, value.clone())).await;
            let activity = if timed.result.is_ok() {
                CacheActivity::Backfilled
            } else {
                CacheActivity::Skipped
            };
            self.record(CacheOperation::Backfill, activity, Some(index), Some(timed.duration));
        }
    }
}

impl<K, V> CacheTier<K, V> for TieredCache<K, V>
where
    K: Send + Sync,
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &K) -> Result<V, Error> {
        let mut last_error = Error::NotFound;

        for (index, tier) in self.inner.tiers.iter().enumerate() {
            let timed = self.clock().timed_async(tier.get(key)).await;
            match timed.result {
                Ok(value) => {
                    self.record(CacheOperation::Get, CacheActivity::Hit, Some(index), Some(timed.duration));
                    self.backfill(key, &value).await;
                    return Ok(value);
                }
                Err(error) => {
                    self.record(CacheOperation::Get, CacheActivity::Fallback, Some(index), Some(timed.duration));
                    last_error = error;
                }
            }
        }

        self.record(CacheOperation::Get, CacheActivity::Miss, None, None);
        Err(last_error)
    }

    async fn set(&self, key: &K, value: V) -> Result<V, Error> {
        let mut echoed = None;

        for (index, tier) in self.inner.tiers.iter().enumerate() {
            let timed = self.clock().timed_async(tier.set(key, value.clone())).await;
            match timed.result {
                Ok(stored) => {
                    self.record(CacheOperation::Set, CacheActivity::Inserted, Some(index), Some(timed.duration));
                    echoed = Some(stored);
                }
                Err(error) => {
                    self.record(CacheOperation::Set, CacheActivity::Error, Some(index), Some(timed.duration));
                    return Err(error);
                }
            }
        }

        Ok(echoed.unwrap_or(value))
    }

    async fn delete(&self, key: &K) -> Result<bool, Error> {
        let mut removed = false;

        for (index, tier) in self.inner.tiers.iter().enumerate() {
            let timed = self.clock().timed_async(tier.delete(key)).await;
            match timed.result {
                Ok(deleted) => {
                    self.record(CacheOperation::Delete, CacheActivity::Deleted, Some(index), Some(timed.duration));
                    removed |= deleted;
                }
                Err(error) => {
                    self.record(CacheOperation::Delete, CacheActivity::Error, Some(index), Some(timed.duration));
                    return Err(error);
                }
            }
        }

        Ok(removed)
    }

    async fn purge(&self) -> Result<bool, Error> {
        let mut purged = false;

        for (index, tier) in self.inner.tiers.iter().enumerate() {
            let timed = self.clock().timed_async(tier.purge()).await;
            match timed.result {
                Ok(result) => {
                    self.record(CacheOperation::Purge, CacheActivity::Purged, Some(index), Some(timed.duration));
                    purged = result;
                }
                Err(error) if error.is_not_implemented() => {
                    self.record(CacheOperation::Purge, CacheActivity::Unsupported, Some(index), Some(timed.duration));
                }
                Err(_) => {
                    self.record(CacheOperation::Purge, CacheActivity::Skipped, Some(index), Some(timed.duration));
                }
            }
        }

        Ok(purged)
    }
}
