// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock cache implementation for testing.
//!
//! This module provides `MockCache`, a minimal in-memory backend that implements only the
//! required [`CacheTier`] operations, records every call, and supports failure injection.
//! It stands in for backends such as persistent key-value stores that have no `count`,
//! `limit` or `purge` support.

use std::{collections::HashMap, hash::Hash, sync::Arc};

use parking_lot::Mutex;

use crate::{CacheTier, Error};

/// Recorded cache operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOp<K, V> {
    /// A get operation was performed with the given key.
    Get(K),
    /// A set operation was performed with the given key and value.
    Set {
        /// The key that was written.
        key: K,
        /// The value that was written.
        value: V,
    },
    /// A delete operation was performed with the given key.
    Delete(K),
}

type FailPredicate<K, V> = Box<dyn Fn(&CacheOp<K, V>) -> bool + Send + Sync>;

/// A configurable mock cache for testing.
///
/// Clones share data, recorded operations and the failure predicate.
///
/// # Examples
///
/// ```
/// use strata_tier::{testing::{MockCache, CacheOp}, CacheTier};
///
/// # futures::executor::block_on(async {
/// let cache = MockCache::<String, i32>::new();
///
/// cache.set(&"key".to_string(), 42).await.unwrap();
/// assert_eq!(cache.get(&"key".to_string()).await.unwrap(), 42);
///
/// assert_eq!(cache.operations(), vec![
///     CacheOp::Set { key: "key".to_string(), value: 42 },
///     CacheOp::Get("key".to_string()),
/// ]);
/// # });
/// ```
///
/// # Failure Injection
///
/// ```
/// use strata_tier::{testing::{MockCache, CacheOp}, CacheTier};
///
/// # futures::executor::block_on(async {
/// let cache: MockCache<String, i32> = MockCache::new();
///
/// cache.fail_when(|op| matches!(op, CacheOp::Set { key, .. } if key == "forbidden"));
/// assert!(cache.set(&"forbidden".to_string(), 1).await.is_err());
/// assert!(cache.set(&"allowed".to_string(), 1).await.is_ok());
/// # });
/// ```
pub struct MockCache<K, V> {
    data: Arc<Mutex<HashMap<K, V>>>,
    operations: Arc<Mutex<Vec<CacheOp<K, V>>>>,
    fail_when: Arc<Mutex<Option<FailPredicate<K, V>>>>,
}

impl<K, V> std::fmt::Debug for MockCache<K, V>
where
    K: std::fmt::Debug,
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCache")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl<K, V> Clone for MockCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
        }
    }
}

impl<K, V> Default for MockCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MockCache<K, V> {
    /// Creates a new empty mock cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }
}

impl<K, V> MockCache<K, V>
where
    K: Eq + Hash,
{
    /// Creates a mock cache with pre-populated data.
    #[must_use]
    pub fn with_data(data: HashMap<K, V>) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the number of entries in the cache.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if the cache contains the given key.
    ///
    /// Unlike `has`, this does not record an operation.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.data.lock().contains_key(key)
    }
}

impl<K, V> MockCache<K, V>
where
    K: Clone,
    V: Clone,
{
    /// Sets a predicate that determines when operations should fail.
    ///
    /// Failing operations are still recorded but leave the data untouched and return
    /// [`Error::Backend`].
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&CacheOp<K, V>) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<CacheOp<K, V>> {
        self.operations.lock().clone()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: CacheOp<K, V>) -> bool {
        let fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        self.operations.lock().push(op);
        fail
    }
}

impl<K, V> CacheTier<K, V> for MockCache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &K) -> Result<V, Error> {
        if self.record(CacheOp::Get(key.clone())) {
            return Err(Error::backend("mock: get failed"));
        }
        self.data.lock().get(key).cloned().ok_or(Error::NotFound)
    }

    async fn set(&self, key: &K, value: V) -> Result<V, Error> {
        let op = CacheOp::Set {
            key: key.clone(),
            value: value.clone(),
        };
        if self.record(op) {
            return Err(Error::backend("mock: set failed"));
        }
        self.data.lock().insert(key.clone(), value.clone());
        Ok(value)
    }

    async fn delete(&self, key: &K) -> Result<bool, Error> {
        if self.record(CacheOp::Delete(key.clone())) {
            return Err(Error::backend("mock: delete failed"));
        }
        Ok(self.data.lock().remove(key).is_some())
    }
}
