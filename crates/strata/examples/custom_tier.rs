// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Expiring Values Example
//!
//! Shows how values decide their own staleness through `Expirable`, and how the
//! memory tier drops them on read and on `purge`.

use std::time::{Duration, Instant};

use strata::{CacheTier, CacheTierExt, Error, Expirable, Expiring, MemoryCache, TieredCache};

/// A session token that expires at a fixed instant.
#[derive(Clone, Debug)]
struct Session {
    user: String,
    valid_until: Instant,
}

impl Expirable for Session {
    fn has_expired(&self) -> bool {
        Instant::now() >= self.valid_until
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    let sessions = TieredCache::<u64, Session>::builder()
        .name("sessions")
        .memory(1_000)
        .build();

    sessions
        .set(
            &1,
            Session {
                user: "alice".to_string(),
                valid_until: Instant::now() + Duration::from_secs(3600),
            },
        )
        .await?;
    sessions
        .set(
            &2,
            Session {
                user: "bob".to_string(),
                valid_until: Instant::now(),
            },
        )
        .await?;

    let session = sessions.get(&1).await?;
    println!("session 1 belongs to {}", session.user);

    match sessions.get(&2).await {
        Err(Error::Expired) => println!("session 2 expired"),
        other => println!("session 2: {other:?}"),
    }

    // Values that do not carry their own deadline can be wrapped in `Expiring`.
    let tokens = MemoryCache::<&'static str, Expiring<String>>::new();
    tokens
        .set(&"api", Expiring::with_ttl("secret".to_string(), Duration::from_millis(50)))
        .await?;
    println!("token present: {}", tokens.has(&"api").await);

    tokio::time::sleep(Duration::from_millis(60)).await;
    println!("purged expired tokens: {}", tokens.purge().await?);
    println!("tokens left: {}", tokens.count().await?);

    Ok(())
}
