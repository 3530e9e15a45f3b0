// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache telemetry implementation and recording.

use std::{sync::Arc, time::Duration};

#[cfg(any(feature = "metrics", test))]
use opentelemetry::{
    KeyValue,
    metrics::{Counter, Histogram, Meter},
};

use tick::Clock;

use crate::{
    CacheName,
    telemetry::{CacheActivity, CacheOperation, Severity},
};
#[cfg(any(feature = "metrics", test))]
use crate::telemetry::{
    attributes,
    metrics::{create_event_counter, create_operation_duration_histogram},
};

/// Records cache events as logs and metrics.
///
/// Cloning is cheap; clones share the same clock and instruments.
#[derive(Clone, Debug)]
pub(crate) struct CacheTelemetry {
    inner: Arc<CacheTelemetryInner>,
}

#[derive(Debug)]
struct CacheTelemetryInner {
    clock: Clock,
    logging_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    event_counter: Option<Counter<u64>>,
    #[cfg(any(feature = "metrics", test))]
    operation_duration: Option<Histogram<f64>>,
}

impl CacheTelemetry {
    /// Creates a telemetry recorder that times with `clock` and records nothing.
    #[must_use]
    pub fn disabled(clock: Clock) -> Self {
        Self::new(
            clock,
            false,
            #[cfg(any(feature = "metrics", test))]
            None,
        )
    }

    /// Creates a telemetry recorder.
    ///
    /// Tier calls are timed with `clock`. Metric instruments are created from `meter`
    /// when one is given.
    #[must_use]
    pub fn new(clock: Clock, logging_enabled: bool, #[cfg(any(feature = "metrics", test))] meter: Option<&Meter>) -> Self {
        Self {
            inner: Arc::new(CacheTelemetryInner {
                clock,
                logging_enabled,
                #[cfg(any(feature = "metrics", test))]
                event_counter: meter.map(create_event_counter),
                #[cfg(any(feature = "metrics", test))]
                operation_duration: meter.map(create_operation_duration_histogram),
            }),
        }
    }

    /// Returns the clock used to time tier calls.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.inner.clock
    }

    /// Records a cache event.
    ///
    /// # Arguments
    ///
    /// * `cache_name` - Static string identifying the cache instance
    /// * `operation` - The type of cache operation
    /// * `activity` - What happened
    /// * `tier` - Index of the tier the event concerns, if any
    /// * `duration` - Optional duration of the tier call
    #[inline]
    pub(crate) fn record(
        &self,
        cache_name: CacheName,
        operation: CacheOperation,
        activity: CacheActivity,
        tier: Option<usize>,
        duration: Option<Duration>,
    ) {
        #[cfg(any(feature = "metrics", test))]
        self.record_metrics(cache_name, operation, activity, duration);

        if self.inner.logging_enabled {
            Self::emit(cache_name, operation, activity, tier, duration);
        }
    }

    #[cfg(any(feature = "metrics", test))]
    fn record_metrics(&self, cache_name: CacheName, operation: CacheOperation, activity: CacheActivity, duration: Option<Duration>) {
        if self.inner.event_counter.is_none() && self.inner.operation_duration.is_none() {
            return;
        }

        let attrs = [
            KeyValue::new(attributes::CACHE_NAME, cache_name),
            KeyValue::new(attributes::CACHE_OPERATION_NAME, operation.as_str()),
            KeyValue::new(attributes::CACHE_ACTIVITY_NAME, activity.as_str()),
        ];

        if let Some(c) = &self.inner.event_counter {
            c.add(1, &attrs);
        }

        if let (Some(d), Some(h)) = (duration, &self.inner.operation_duration) {
            h.record(d.as_secs_f64(), &attrs);
        }
    }

    fn emit(cache_name: CacheName, operation: CacheOperation, activity: CacheActivity, tier: Option<usize>, duration: Option<Duration>) {
        let op = operation.as_str();
        let ev = activity.as_str();
        let duration_ns = duration.map(|d| d.as_nanos());

        // Tracing level must be constant, so a macro selects the level.
        // Field names must match constants in attributes.rs.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    cache.name = cache_name,
                    cache.operation = op,
                    cache.activity = ev,
                    cache.tier = ?tier,
                    cache.duration_ns = ?duration_ns,
                    "cache.event"
                )
            };
        }

        match activity.severity() {
            Severity::Error => emit_event!(error),
            Severity::Warn => emit_event!(warn),
            Severity::Info => emit_event!(info),
            Severity::Debug => emit_event!(debug),
        }
    }
}
