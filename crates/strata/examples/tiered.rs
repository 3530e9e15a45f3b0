// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Two-Tier Cache Example
//!
//! Puts a small in-memory tier in front of a slow store that only supports the
//! required operations:
//!
//! - Reads that miss the memory tier are served by the store and copied back
//!   into the memory tier
//! - Writes and deletes reach both tiers
//! - `purge` skips the store, which cannot purge

use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;
use strata::{CacheTier, Error, MemoryCache, TelemetryConfig, TieredCache};

/// A stand-in for a persistent key-value store. Clones share the same data.
#[derive(Clone, Debug, Default)]
struct SlowStore {
    data: Arc<Mutex<HashMap<String, String>>>,
    reads: Arc<Mutex<u32>>,
}

impl CacheTier<String, String> for SlowStore {
    async fn get(&self, key: &String) -> Result<String, Error> {
        *self.reads.lock() += 1;
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.data.lock().get(key).cloned().ok_or(Error::NotFound)
    }

    async fn set(&self, key: &String, value: String) -> Result<String, Error> {
        self.data.lock().insert(key.clone(), value.clone());
        Ok(value)
    }

    async fn delete(&self, key: &String) -> Result<bool, Error> {
        Ok(self.data.lock().remove(key).is_some())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let store = SlowStore::default();
    store.data.lock().insert("user:1".to_string(), "Alice".to_string());

    let memory = MemoryCache::<String, String>::with_limit(100);
    let cache = TieredCache::<String, String>::builder()
        .name("users")
        .tier(memory.clone())
        .tier(store.clone())
        .telemetry(TelemetryConfig::new().with_logs())
        .build();

    // First read falls through to the store and backfills memory.
    let user = cache.get(&"user:1".to_string()).await?;
    println!("first read: {user} (store reads: {})", *store.reads.lock());

    // Second read is served from memory.
    let user = cache.get(&"user:1".to_string()).await?;
    println!("second read: {user} (store reads: {})", *store.reads.lock());

    cache.set(&"user:2".to_string(), "Bob".to_string()).await?;
    println!("memory holds {} entries", memory.count().await?);

    let removed = cache.delete(&"user:1".to_string()).await?;
    println!("deleted user:1: {removed}");

    let purged = cache.purge().await?;
    println!("purge removed anything: {purged}");

    Ok(())
}
