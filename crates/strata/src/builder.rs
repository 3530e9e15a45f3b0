// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for constructing tiered caches.

#[cfg(feature = "memory")]
use std::hash::Hash;

#[cfg(feature = "memory")]
use strata_memory::MemoryCache;
#[cfg(feature = "memory")]
use strata_tier::Expirable;
use strata_tier::{AnyCache, CacheTier};
use tick::Clock;

use crate::{
    TelemetryConfig,
    telemetry::ext::system_clock,
    tiered::{CacheName, DEFAULT_NAME, TieredCache},
};

/// Builder for a [`TieredCache`].
///
/// Tiers are consulted in the order they are added: the first added tier is asked first.
///
/// # Examples
///
/// ```
/// use strata::{MemoryCache, TelemetryConfig, TieredCache};
///
/// let cache = TieredCache::<String, i32>::builder()
///     .name("profiles")
///     .memory(1_000)
///     .tier(MemoryCache::new())
///     .telemetry(TelemetryConfig::new().with_logs())
///     .build();
///
/// assert_eq!(cache.name(), "profiles");
/// assert_eq!(cache.tiers().len(), 2);
/// ```
#[derive(Debug)]
pub struct TieredCacheBuilder<K, V> {
    name: CacheName,
    tiers: Vec<AnyCache<K, V>>,
    telemetry: TelemetryConfig,
    clock: Option<Clock>,
}

impl<K, V> TieredCacheBuilder<K, V>
where
    K: Send + Sync + 'static,
    V: Send + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            name: DEFAULT_NAME,
            tiers: Vec::new(),
            telemetry: TelemetryConfig::default(),
            clock: None,
        }
    }

    /// Sets the name reported in logs and metrics.
    #[must_use]
    pub fn name(mut self, name: CacheName) -> Self {
        self.name = name;
        self
    }

    /// Appends a tier to the end of the chain.
    #[must_use]
    pub fn tier<T>(mut self, tier: T) -> Self
    where
        T: CacheTier<K, V> + 'static,
    {
        self.tiers.push(AnyCache::new(tier));
        self
    }

    /// Appends already type-erased tiers to the end of the chain, preserving their order.
    #[must_use]
    pub fn tiers<I>(mut self, tiers: I) -> Self
    where
        I: IntoIterator<Item = AnyCache<K, V>>,
    {
        self.tiers.extend(tiers);
        self
    }

    /// Appends an in-memory tier holding at most `limit` entries (`0` means unbounded).
    #[cfg(feature = "memory")]
    #[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
    #[must_use]
    pub fn memory(self, limit: usize) -> Self
    where
        K: Clone + Hash + Eq,
        V: Clone + Expirable,
    {
        self.tier(MemoryCache::<K, V>::with_limit(limit))
    }

    /// Configures logs and metrics for the chain.
    #[must_use]
    pub fn telemetry(mut self, config: TelemetryConfig) -> Self {
        self.telemetry = config;
        self
    }

    /// Sets the clock used to time tier calls.
    ///
    /// Defaults to the system's monotonic clock.
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the configured chain.
    #[must_use]
    pub fn build(self) -> TieredCache<K, V> {
        let clock = self.clock.unwrap_or_else(system_clock);
        TieredCache::from_parts(self.name, self.tiers, self.telemetry.build(clock))
    }
}
