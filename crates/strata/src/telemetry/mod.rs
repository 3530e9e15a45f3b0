// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache telemetry integration with `tracing` and OpenTelemetry.
//!
//! Every tier visited by a [`TieredCache`](crate::TieredCache) operation is recorded as a
//! `cache.event`: a structured `tracing` event when logs are enabled, and a counter plus a
//! duration histogram when the `metrics` feature is enabled and a meter provider is configured.

pub(crate) mod attributes;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod ext;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

pub(crate) use cache::CacheTelemetry;
pub use config::TelemetryConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheOperation {
    Get,
    Set,
    Delete,
    Purge,
    Backfill,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "cache.get",
            Self::Set => "cache.set",
            Self::Delete => "cache.delete",
            Self::Purge => "cache.purge",
            Self::Backfill => "cache.backfill",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    /// A tier answered a read.
    Hit,
    /// No tier answered a read.
    Miss,
    /// A tier failed a read and the next tier was consulted.
    Fallback,
    /// A value was copied into a tier that lacked it.
    Backfilled,
    Inserted,
    Deleted,
    Purged,
    /// A tier does not support the requested capability.
    Unsupported,
    /// A tier failed and the chain carried on without it.
    Skipped,
    Error,
}

impl CacheActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::Fallback => "cache.fallback",
            Self::Backfilled => "cache.backfilled",
            Self::Inserted => "cache.inserted",
            Self::Deleted => "cache.deleted",
            Self::Purged => "cache.purged",
            Self::Unsupported => "cache.unsupported",
            Self::Skipped => "cache.skipped",
            Self::Error => "cache.error",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::Hit | Self::Miss | Self::Fallback | Self::Unsupported => Severity::Debug,
            Self::Backfilled | Self::Inserted | Self::Deleted | Self::Purged => Severity::Info,
            Self::Skipped => Severity::Warn,
            Self::Error => Severity::Error,
        }
    }
}

/// Log level of a cache event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}
