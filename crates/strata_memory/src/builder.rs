// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory caches.

use std::hash::Hash;
use std::marker::PhantomData;

use crate::store::MemoryCache;

/// Builder for configuring a `MemoryCache`.
///
/// # Examples
///
/// ```
/// use strata_memory::MemoryCache;
///
/// let cache = MemoryCache::<String, i32>::builder()
///     .limit(1000)
///     .initial_capacity(100)
///     .build();
/// assert_eq!(cache.len(), 0);
/// ```
#[derive(Debug)]
pub struct MemoryCacheBuilder<K, V> {
    pub(crate) limit: usize,
    pub(crate) initial_capacity: usize,
    _phantom: PhantomData<(K, V)>,
}

impl<K, V> Default for MemoryCacheBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MemoryCacheBuilder<K, V> {
    /// Creates a new builder for an unbounded cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            limit: 0,
            initial_capacity: 0,
            _phantom: PhantomData,
        }
    }

    /// Sets the maximum number of entries.
    ///
    /// When a `set` pushes the cache over the limit, the least recently inserted entry is
    /// evicted. Re-setting a key counts as a fresh insertion. `0` means unbounded.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_memory::MemoryCache;
    ///
    /// let cache = MemoryCache::<String, i32>::builder().limit(2).build();
    /// # use strata_tier::CacheTier;
    /// assert_eq!(cache.limit(), 2);
    /// ```
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the initial capacity (pre-allocation hint) for the key index.
    ///
    /// The cache may still grow beyond this size unless a limit is set.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Builds the configured `MemoryCache`.
    #[must_use]
    pub fn build(self) -> MemoryCache<K, V>
    where
        K: Hash + Eq,
    {
        MemoryCache::from_builder(&self)
    }
}
