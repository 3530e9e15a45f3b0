// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Bounded in-memory cache tier.
//!
//! Entries are kept in insertion order. A `set` on an existing key moves it to the back,
//! and when a limit is configured the front (oldest) entries are evicted first.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    hash::Hash,
    sync::Arc,
};

use parking_lot::Mutex;
use strata_tier::{CacheTier, Error, Expirable};

use crate::builder::MemoryCacheBuilder;

/// Insertion-ordered entries.
///
/// `order` maps a monotonically increasing sequence number to the entry, so its first
/// element is always the oldest. `index` maps each key to its current sequence number.
struct Entries<K, V> {
    index: HashMap<K, u64>,
    order: BTreeMap<u64, (K, V)>,
    next_seq: u64,
}

impl<K, V> Entries<K, V>
where
    K: Hash + Eq,
{
    fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let seq = self.index.remove(key)?;
        self.order.remove(&seq).map(|(_, value)| value)
    }

    fn push_back(&mut self, key: K, value: V)
    where
        K: Clone,
    {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(key.clone(), seq);
        self.order.insert(seq, (key, value));
    }

    fn evict_to(&mut self, limit: usize) {
        while limit > 0 && self.order.len() > limit {
            let Some((_, (key, _))) = self.order.pop_first() else {
                break;
            };
            self.index.remove(&key);
        }
    }
}

impl<K, V> Entries<K, V>
where
    K: Hash + Eq,
    V: Expirable,
{
    fn purge_expired(&mut self) -> usize {
        let Self { index, order, .. } = self;
        let before = order.len();
        order.retain(|_, (key, value)| {
            if value.has_expired() {
                index.remove(&*key);
                false
            } else {
                true
            }
        });
        before - order.len()
    }
}

/// A bounded, insertion-ordered in-memory cache tier.
///
/// This cache provides:
/// - FIFO eviction once the configured limit is exceeded, with re-insertion refreshing a key
/// - Removal of expired values on `get` and `purge` (see [`Expirable`])
/// - Support for every optional capability: `count`, `limit` and `purge`
///
/// Each state transition runs inside one critical section, so concurrent callers always
/// observe a complete mutation. Clones share the same entries.
///
/// # Examples
///
/// ```
/// use strata_memory::MemoryCache;
/// use strata_tier::CacheTier;
/// # futures::executor::block_on(async {
///
/// let cache = MemoryCache::<String, i32>::with_limit(2);
///
/// cache.set(&"a".to_string(), 1).await?;
/// cache.set(&"b".to_string(), 2).await?;
/// cache.set(&"c".to_string(), 3).await?;
///
/// assert!(cache.get(&"a".to_string()).await.unwrap_err().is_not_found());
/// assert_eq!(cache.get(&"c".to_string()).await?, 3);
/// # Ok::<(), strata_tier::Error>(())
/// # });
/// ```
pub struct MemoryCache<K, V> {
    entries: Arc<Mutex<Entries<K, V>>>,
    limit: usize,
}

impl<K, V> Debug for MemoryCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("limit", &self.limit)
            .field("len", &self.entries.lock().order.len())
            .finish()
    }
}

impl<K, V> Clone for MemoryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            limit: self.limit,
        }
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MemoryCache<K, V>
where
    K: Hash + Eq,
{
    /// Creates a new unbounded in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new in-memory cache holding at most `limit` entries.
    ///
    /// `0` means unbounded.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self::builder().limit(limit).build()
    }

    /// Creates a new builder for configuring an in-memory cache.
    #[must_use]
    pub fn builder() -> MemoryCacheBuilder<K, V> {
        MemoryCacheBuilder::new()
    }

    pub(crate) fn from_builder(builder: &MemoryCacheBuilder<K, V>) -> Self {
        let capacity = if builder.limit > 0 {
            builder.initial_capacity.min(builder.limit)
        } else {
            builder.initial_capacity
        };

        Self {
            entries: Arc::new(Mutex::new(Entries::with_capacity(capacity))),
            limit: builder.limit,
        }
    }

    /// Returns the number of entries currently stored, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the stored keys, oldest first.
    #[must_use]
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.entries.lock().order.values().map(|(key, _)| key.clone()).collect()
    }
}

impl<K, V> CacheTier<K, V> for MemoryCache<K, V>
where
    K: Clone + Hash + Eq + Send + Sync,
    V: Clone + Expirable + Send,
{
    async fn get(&self, key: &K) -> Result<V, Error> {
        let mut entries = self.entries.lock();
        let seq = *entries.index.get(key).ok_or(Error::NotFound)?;
        let expired = match entries.order.get(&seq) {
            Some((_, value)) if !value.has_expired() => return Ok(value.clone()),
            Some(_) => true,
            None => false,
        };
        entries.remove(key);
        Err(if expired { Error::Expired } else { Error::NotFound })
    }

    async fn set(&self, key: &K, value: V) -> Result<V, Error> {
        let mut entries = self.entries.lock();
        entries.remove(key);
        entries.push_back(key.clone(), value.clone());
        entries.evict_to(self.limit);
        Ok(value)
    }

    async fn delete(&self, key: &K) -> Result<bool, Error> {
        Ok(self.entries.lock().remove(key).is_some())
    }

    async fn count(&self) -> Result<usize, Error> {
        Ok(self.len())
    }

    fn limit(&self) -> usize {
        self.limit
    }

    async fn purge(&self) -> Result<bool, Error> {
        Ok(self.entries.lock().purge_expired() > 0)
    }
}
