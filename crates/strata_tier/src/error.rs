// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for cache operations.

use std::fmt;

/// An optional capability that a cache backend may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Counting the stored entries.
    Count,
    /// Removing every expired entry in one pass.
    Purge,
}

impl Capability {
    /// Returns the capability name as used in error messages and telemetry.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Purge => "purge",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error from a cache operation.
///
/// The first three variants form the contract every backend speaks. [`Error::Backend`] carries
/// failures that originate in a backend's own machinery, such as I/O against a persistent store.
///
/// # Examples
///
/// ```
/// use strata_tier::{Capability, Error};
///
/// let error = Error::NotImplemented(Capability::Purge);
/// assert!(error.is_not_implemented());
/// assert_eq!(error.to_string(), "cache does not implement `purge`");
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No entry exists for the requested key.
    #[error("key not found")]
    NotFound,

    /// An entry existed but its value reported itself as expired. The entry has been removed.
    #[error("value has expired")]
    Expired,

    /// The backend does not support the requested optional capability.
    #[error("cache does not implement `{0}`")]
    NotImplemented(Capability),

    /// The backend failed for a reason of its own.
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Creates a backend error from any error or message.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_tier::Error;
    ///
    /// let error = Error::backend("disk unavailable");
    /// assert_eq!(error.to_string(), "disk unavailable");
    /// ```
    pub fn backend(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(cause.into())
    }

    /// Returns `true` if the key was absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Returns `true` if the value was present but expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Returns `true` if an optional capability is missing.
    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented(_))
    }
}

/// A specialized [`Result`] type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;
