// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Type-erased cache tier handle.

use std::{fmt::Debug, sync::Arc};

use crate::{CacheTier, Error, tier::DynCacheTier};

/// Extension trait for converting any `CacheTier` into an [`AnyCache`].
///
/// This trait is automatically implemented for all types that implement `CacheTier`.
///
/// # Examples
///
/// ```
/// use strata_tier::{AnyCache, AnyCacheExt, CacheTier};
///
/// fn erase<T>(tier: T) -> AnyCache<String, i32>
/// where
///     T: CacheTier<String, i32> + 'static,
/// {
///     tier.into_any()
/// }
/// ```
pub trait AnyCacheExt<K, V>: Sized {
    /// Converts this cache tier into an `AnyCache`.
    fn into_any(self) -> AnyCache<K, V>;
}

impl<K, V, T> AnyCacheExt<K, V> for T
where
    T: CacheTier<K, V> + 'static,
    K: Send + Sync + 'static,
    V: Send + 'static,
{
    fn into_any(self) -> AnyCache<K, V> {
        AnyCache::new(self)
    }
}

/// A clonable, type-erased handle over any cache tier.
///
/// `AnyCache` lets heterogeneous backends with the same key and value types sit in one
/// collection. It holds no state of its own: every call is forwarded to the wrapped backend,
/// and optional capabilities the backend lacks surface as [`Error::NotImplemented`].
///
/// Clones share the same backend.
///
/// # Examples
///
/// ```
/// use strata_tier::{AnyCache, CacheTier, Error};
/// # use strata_tier::Capability;
///
/// struct Echo;
///
/// impl CacheTier<u32, u32> for Echo {
///     async fn get(&self, key: &u32) -> Result<u32, Error> {
///         Ok(*key)
///     }
///
///     async fn set(&self, _key: &u32, value: u32) -> Result<u32, Error> {
///         Ok(value)
///     }
///
///     async fn delete(&self, _key: &u32) -> Result<bool, Error> {
///         Ok(false)
///     }
/// }
///
/// # futures::executor::block_on(async {
/// let cache: AnyCache<u32, u32> = AnyCache::new(Echo);
/// assert_eq!(cache.get(&7).await?, 7);
/// assert!(matches!(cache.purge().await, Err(Error::NotImplemented(Capability::Purge))));
/// # Ok::<(), Error>(())
/// # });
/// ```
pub struct AnyCache<K, V>(Arc<DynCacheTier<'static, K, V>>);

impl<K, V> AnyCache<K, V>
where
    K: Send + Sync + 'static,
    V: Send + 'static,
{
    /// Wraps a concrete cache tier.
    pub fn new<T>(tier: T) -> Self
    where
        T: CacheTier<K, V> + 'static,
    {
        Self(DynCacheTier::new_arc(tier))
    }
}

impl<K, V> Debug for AnyCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyCache").finish_non_exhaustive()
    }
}

impl<K, V> Clone for AnyCache<K, V> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<K, V> CacheTier<K, V> for AnyCache<K, V>
where
    K: Sync,
    V: Send,
{
    async fn get(&self, key: &K) -> Result<V, Error> {
        self.0.get(key).await
    }

    async fn set(&self, key: &K, value: V) -> Result<V, Error> {
        self.0.set(key, value).await
    }

    async fn delete(&self, key: &K) -> Result<bool, Error> {
        self.0.delete(key).await
    }

    async fn count(&self) -> Result<usize, Error> {
        self.0.count().await
    }

    fn limit(&self) -> usize {
        self.0.limit()
    }

    async fn purge(&self) -> Result<bool, Error> {
        self.0.purge().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Capability;

    /// Tier overriding `count` and `limit` but not `purge`.
    struct Bounded;

    impl CacheTier<u8, u8> for Bounded {
        async fn get(&self, key: &u8) -> Result<u8, Error> {
            Ok(*key)
        }

        async fn set(&self, _key: &u8, value: u8) -> Result<u8, Error> {
            Ok(value)
        }

        async fn delete(&self, _key: &u8) -> Result<bool, Error> {
            Ok(true)
        }

        async fn count(&self) -> Result<usize, Error> {
            Ok(3)
        }

        fn limit(&self) -> usize {
            3
        }
    }

    fn assert_send<T: Send>(value: T) -> T {
        value
    }

    #[test]
    fn erased_tier_keeps_overrides_and_defaults() {
        futures::executor::block_on(async {
            let cache = Bounded.into_any();

            assert_eq!(assert_send(cache.get(&4)).await.expect("get failed"), 4);
            assert_eq!(cache.set(&1, 2).await.expect("set failed"), 2);
            assert!(cache.delete(&1).await.expect("delete failed"));
            assert_eq!(cache.count().await.expect("count failed"), 3);
            assert_eq!(cache.limit(), 3);
            assert!(matches!(cache.purge().await, Err(Error::NotImplemented(Capability::Purge))));
        });
    }

    #[test]
    fn nested_erasure_forwards() {
        futures::executor::block_on(async {
            let twice = AnyCache::new(Bounded.into_any());
            assert_eq!(twice.get(&9).await.expect("get failed"), 9);
            assert_eq!(twice.limit(), 3);
            assert_eq!(format!("{twice:?}"), "AnyCache { .. }");
        });
    }
}
