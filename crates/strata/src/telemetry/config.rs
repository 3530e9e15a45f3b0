// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Telemetry configuration for cache operations.

#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::{Meter, MeterProvider};

use tick::Clock;

use crate::telemetry::CacheTelemetry;

/// Configuration for cache telemetry.
///
/// Use the builder methods to enable logs and/or metrics, then pass
/// this to the cache builder via `.telemetry()`.
///
/// # Examples
///
/// ```
/// use strata::{TelemetryConfig, TieredCache};
///
/// let cache = TieredCache::<String, i32>::builder()
///     .name("sessions")
///     .telemetry(TelemetryConfig::new().with_logs())
///     .build();
/// # let _ = cache;
/// ```
#[derive(Clone, Debug, Default)]
pub struct TelemetryConfig {
    logs_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    meter: Option<Meter>,
}

impl TelemetryConfig {
    /// Creates a new telemetry configuration with everything disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables structured logging for cache operations.
    ///
    /// When enabled, every tier visited by an operation emits a `cache.event` through the
    /// `tracing` crate.
    #[must_use]
    pub fn with_logs(self) -> Self {
        Self {
            logs_enabled: true,
            ..self
        }
    }

    /// Enables metrics collection using the provided meter provider.
    ///
    /// When enabled, cache operations emit a `cache.event.count` counter and a
    /// `cache.operation.duration` histogram via OpenTelemetry.
    #[cfg(any(feature = "metrics", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    #[must_use]
    pub fn with_metrics(mut self, provider: &dyn MeterProvider) -> Self {
        use crate::telemetry::metrics;
        self.meter = Some(metrics::create_meter(provider));
        self
    }

    /// Builds the telemetry recorder from this configuration, timing tier calls with `clock`.
    #[must_use]
    pub(crate) fn build(self, clock: Clock) -> CacheTelemetry {
        CacheTelemetry::new(
            clock,
            self.logs_enabled,
            #[cfg(any(feature = "metrics", test))]
            self.meter.as_ref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tick::ClockControl;

    use crate::telemetry::testing::{LogCapture, MetricTester};
    use crate::telemetry::{CacheActivity, CacheOperation};

    #[test]
    fn default_config_records_nothing() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let telemetry = TelemetryConfig::new().build(ClockControl::new().to_clock());
        telemetry.record("cache", CacheOperation::Set, CacheActivity::Inserted, Some(0), None);

        assert!(capture.output().is_empty());
    }

    #[test]
    fn with_logs_enables_logging() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let telemetry = TelemetryConfig::new().with_logs().build(ClockControl::new().to_clock());
        telemetry.record("logged", CacheOperation::Set, CacheActivity::Inserted, Some(0), None);

        capture.assert_contains("logged");
        capture.assert_contains(CacheActivity::Inserted.as_str());
    }

    #[test]
    fn with_metrics_enables_metrics() {
        let tester = MetricTester::new();
        let telemetry = TelemetryConfig::new()
            .with_metrics(tester.meter_provider())
            .build(ClockControl::new().to_clock());

        telemetry.record("metered", CacheOperation::Purge, CacheActivity::Purged, Some(1), None);

        assert_eq!(tester.event_count(CacheActivity::Purged), 1);
        assert!(tester.event_attributes().contains(&opentelemetry::KeyValue::new(
            crate::telemetry::attributes::CACHE_NAME,
            "metered",
        )));
    }
}
