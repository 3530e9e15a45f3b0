// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for cache storage backends.
//!
//! [`CacheTier`] defines the interface that all cache backends must implement.
//! Backends provide the three required operations and opt into `count`, `limit`
//! and `purge` by overriding the defaults.

use crate::{Capability, Error};

/// Trait for cache tier implementations.
///
/// `get`, `set` and `delete` are required. The optional capabilities have defaults:
/// - `count`: fails with [`Error::NotImplemented`]
/// - `limit`: returns `0` (unbounded)
/// - `purge`: fails with [`Error::NotImplemented`]
///
/// Every operation is a lazy future; no side effect happens until it is polled.
#[dynosaur::dynosaur(pub(crate) DynCacheTier = dyn(box) CacheTier, bridge(none))]
pub trait CacheTier<K, V>: Send + Sync {
    /// Gets the value stored for `key`.
    ///
    /// Fails with [`Error::NotFound`] if the key is absent and with [`Error::Expired`]
    /// if the value expired, in which case the entry is removed.
    fn get(&self, key: &K) -> impl Future<Output = Result<V, Error>> + Send;

    /// Stores `value` under `key`, replacing any previous value, and echoes it back.
    fn set(&self, key: &K, value: V) -> impl Future<Output = Result<V, Error>> + Send;

    /// Removes the entry for `key`, returning whether an entry was removed.
    fn delete(&self, key: &K) -> impl Future<Output = Result<bool, Error>> + Send;

    /// Returns the number of stored entries, if supported.
    fn count(&self) -> impl Future<Output = Result<usize, Error>> + Send {
        async { Err(Error::NotImplemented(Capability::Count)) }
    }

    /// Returns the configured entry limit. `0` means unbounded.
    fn limit(&self) -> usize {
        0
    }

    /// Removes every expired entry, returning whether anything was removed, if supported.
    fn purge(&self) -> impl Future<Output = Result<bool, Error>> + Send {
        async { Err(Error::NotImplemented(Capability::Purge)) }
    }
}

/// Operations derived from the required [`CacheTier`] methods.
///
/// Implemented automatically for every cache tier.
pub trait CacheTierExt<K, V>: CacheTier<K, V> {
    /// Returns `true` if `get` would succeed for `key`.
    ///
    /// Any error, including [`Error::Expired`], maps to `false`. Because this goes through
    /// `get`, checking an expired key removes it.
    fn has(&self, key: &K) -> impl Future<Output = bool> + Send;
}

impl<K, V, T> CacheTierExt<K, V> for T
where
    T: CacheTier<K, V> + ?Sized,
    K: Sync,
{
    async fn has(&self, key: &K) -> bool {
        self.get(key).await.is_ok()
    }
}
