// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Value-level expiration.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    ops::Deref,
    sync::Arc,
    time::{Duration, Instant},
};

/// A value that can report whether it has expired.
///
/// Expiration is a property of the value, not of the store holding it. Stores that honor it
/// treat an expired value as absent and remove it when they encounter it.
///
/// The default implementation never expires, so plain data types opt in with an empty impl.
///
/// # Examples
///
/// ```
/// use strata_tier::Expirable;
///
/// struct Token {
///     revoked: bool,
/// }
///
/// impl Expirable for Token {
///     fn has_expired(&self) -> bool {
///         self.revoked
///     }
/// }
///
/// assert!(Token { revoked: true }.has_expired());
/// assert!(!"plain".to_string().has_expired());
/// ```
pub trait Expirable {
    /// Returns `true` if the value should no longer be served.
    fn has_expired(&self) -> bool {
        false
    }
}

macro_rules! never_expires {
    ($($ty:ty),* $(,)?) => {
        $(impl Expirable for $ty {})*
    };
}

never_expires!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    &'static str,
);

impl<T> Expirable for Vec<T> {}
impl<T> Expirable for VecDeque<T> {}
impl<K, T, S> Expirable for HashMap<K, T, S> {}
impl<K, T> Expirable for BTreeMap<K, T> {}

impl<T: Expirable + ?Sized> Expirable for Box<T> {
    fn has_expired(&self) -> bool {
        (**self).has_expired()
    }
}

impl<T: Expirable + ?Sized> Expirable for Arc<T> {
    fn has_expired(&self) -> bool {
        (**self).has_expired()
    }
}

impl<T: Expirable> Expirable for Option<T> {
    fn has_expired(&self) -> bool {
        self.as_ref().is_some_and(Expirable::has_expired)
    }
}

/// A value paired with the instant after which it expires.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use strata_tier::{Expirable, Expiring};
///
/// let fresh = Expiring::with_ttl("session", Duration::from_secs(60));
/// assert!(!fresh.has_expired());
/// assert_eq!(*fresh, "session");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiring<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Expiring<V> {
    /// Creates a value that expires at `expires_at`.
    pub fn new(value: V, expires_at: Instant) -> Self {
        Self { value, expires_at }
    }

    /// Creates a value that expires `ttl` from now.
    ///
    /// A `ttl` too large to represent saturates to a value that does not expire in practice.
    pub fn with_ttl(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or(now + Duration::from_secs(u64::from(u32::MAX)));
        Self::new(value, expires_at)
    }

    /// Returns the instant after which the value is expired.
    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Returns a reference to the wrapped value.
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the wrapper and returns the inner value.
    #[must_use]
    pub fn into_value(self) -> V {
        self.value
    }
}

impl<V> Expirable for Expiring<V> {
    fn has_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

impl<V> Deref for Expiring<V> {
    type Target = V;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}
