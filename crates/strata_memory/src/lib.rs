// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Bounded, insertion-ordered in-memory cache tier.
//!
//! This crate provides [`MemoryCache`], a [`CacheTier`](strata_tier::CacheTier) that keeps
//! entries in insertion order, evicts the oldest entry once a configured limit is exceeded,
//! and drops values that report themselves as [expired](strata_tier::Expirable).
//!
//! # Quick Start
//!
//! ```
//! use strata_memory::MemoryCacheBuilder;
//! use strata_tier::CacheTier;
//!
//! # futures::executor::block_on(async {
//! let cache = MemoryCacheBuilder::<String, i32>::new()
//!     .limit(1000)
//!     .build();
//!
//! cache.set(&"key".to_string(), 42).await?;
//! assert_eq!(cache.get(&"key".to_string()).await?, 42);
//! assert_eq!(cache.count().await?, 1);
//! # Ok::<(), strata_tier::Error>(())
//! # });
//! ```
//!
//! # Features
//!
//! - **Capacity limits**: FIFO eviction, where re-setting a key refreshes its position
//! - **Expiration**: expired values are removed on `get` and in bulk by `purge`
//! - **Thread-safe**: every mutation runs in a single critical section per cache

pub mod builder;
pub mod store;

#[doc(inline)]
pub use builder::MemoryCacheBuilder;
#[doc(inline)]
pub use store::MemoryCache;
