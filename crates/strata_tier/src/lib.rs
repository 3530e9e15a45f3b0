// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Core cache tier abstractions for building cache backends.
//!
//! This crate defines the [`CacheTier`] trait that all cache backends satisfy, the
//! [`Expirable`] capability for values, the [`Error`] taxonomy, and [`AnyCache`], a
//! type-erased handle used to place different backends side by side in one tier chain.
//!
//! # Implementing a Cache Tier
//!
//! Only `get`, `set` and `delete` are required. `count` and `purge` report
//! [`Error::NotImplemented`] unless overridden, and `limit` reports `0`:
//!
//! ```
//! use strata_tier::{CacheTier, CacheTierExt, Error};
//! use std::collections::HashMap;
//! use std::sync::RwLock;
//!
//! struct SimpleCache<K, V>(RwLock<HashMap<K, V>>);
//!
//! impl<K, V> CacheTier<K, V> for SimpleCache<K, V>
//! where
//!     K: Clone + Eq + std::hash::Hash + Send + Sync,
//!     V: Clone + Send + Sync,
//! {
//!     async fn get(&self, key: &K) -> Result<V, Error> {
//!         self.0.read().unwrap().get(key).cloned().ok_or(Error::NotFound)
//!     }
//!
//!     async fn set(&self, key: &K, value: V) -> Result<V, Error> {
//!         self.0.write().unwrap().insert(key.clone(), value.clone());
//!         Ok(value)
//!     }
//!
//!     async fn delete(&self, key: &K) -> Result<bool, Error> {
//!         Ok(self.0.write().unwrap().remove(key).is_some())
//!     }
//! }
//!
//! # futures::executor::block_on(async {
//! let cache = SimpleCache(RwLock::new(HashMap::new()));
//! cache.set(&"a", 1).await?;
//! assert!(cache.has(&"a").await);
//! assert!(cache.count().await.unwrap_err().is_not_implemented());
//! # Ok::<(), Error>(())
//! # });
//! ```

mod any;
pub mod error;
mod expirable;
#[cfg(any(feature = "test-util", test))]
pub mod testing;
pub(crate) mod tier;

#[doc(inline)]
pub use any::{AnyCache, AnyCacheExt};
#[doc(inline)]
pub use error::{Capability, Error, Result};
#[doc(inline)]
pub use expirable::{Expirable, Expiring};
#[doc(inline)]
pub use tier::{CacheTier, CacheTierExt};
