// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Tiered caching with read-through fallback and backfill.
//!
//! A [`TieredCache`] chains several cache tiers, for example a small in-memory tier in front
//! of a larger persistent store. Reads are answered by the first tier holding the key, and the
//! value is then copied into every tier that lacks it. Writes and deletes are applied to every
//! tier in order.
//!
//! Backends implement [`CacheTier`]. They only need `get`, `set` and `delete`; `count`,
//! `limit` and `purge` are optional capabilities reported through [`Error::NotImplemented`].
//! Values report their own staleness through [`Expirable`].
//!
//! Every tier call is timed with a [`tick::Clock`] for telemetry. The builder defaults to the
//! system clock; [`TieredCacheBuilder::clock`] accepts any other, such as a controlled clock in tests.
//!
//! # Examples
//!
//! ## Two In-Memory Tiers
//!
//! ```
//! use strata::{CacheTier, MemoryCache, TieredCache};
//! # futures::executor::block_on(async {
//!
//! let hot = MemoryCache::<String, String>::with_limit(2);
//! let cold = MemoryCache::<String, String>::new();
//!
//! let cache = TieredCache::<String, String>::builder()
//!     .name("documents")
//!     .tier(hot.clone())
//!     .tier(cold.clone())
//!     .build();
//!
//! cache.set(&"a".to_string(), "alpha".to_string()).await?;
//! assert_eq!(hot.get(&"a".to_string()).await?, "alpha");
//! assert_eq!(cold.get(&"a".to_string()).await?, "alpha");
//!
//! assert!(cache.delete(&"a".to_string()).await?);
//! assert!(cache.get(&"a".to_string()).await.unwrap_err().is_not_found());
//! # Ok::<(), strata::Error>(())
//! # });
//! ```
//!
//! ## Nesting Chains
//!
//! A chain is itself a cache tier, so it can be placed inside another chain:
//!
//! ```
//! use strata::{MemoryCache, TieredCache};
//!
//! let inner = TieredCache::<u64, u64>::builder().memory(10).memory(100).build();
//! let outer = TieredCache::<u64, u64>::builder()
//!     .memory(1)
//!     .tier(inner)
//!     .tier(MemoryCache::new())
//!     .build();
//! assert_eq!(outer.tiers().len(), 3);
//! ```
//!
//! # Features
//!
//! - `memory` (default): the bounded in-memory tier, [`MemoryCache`]
//! - `metrics`: OpenTelemetry metrics via [`TelemetryConfig::with_metrics`]
//! - `test-util`: [`MockCache`], a recording backend with failure injection

pub mod builder;
mod telemetry;
mod tiered;

#[doc(inline)]
pub use builder::TieredCacheBuilder;
#[cfg(feature = "memory")]
#[doc(inline)]
pub use strata_memory::{MemoryCache, MemoryCacheBuilder};
#[doc(inline)]
pub use strata_tier::{AnyCache, AnyCacheExt, CacheTier, CacheTierExt, Capability, Error, Expirable, Expiring, Result};
#[doc(inline)]
pub use telemetry::TelemetryConfig;
#[doc(inline)]
pub use tiered::{CacheName, TieredCache};

#[cfg(any(feature = "test-util", test))]
#[doc(inline)]
pub use strata_tier::testing::{CacheOp, MockCache};
