// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory sinks for asserting on cache telemetry in unit tests.

use std::io::Write;
use std::sync::Arc;

use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::data::{AggregatedMetrics, Metric, MetricData, ResourceMetrics};
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, SdkMeterProvider};
use parking_lot::Mutex;

use crate::telemetry::attributes::CACHE_ACTIVITY_NAME;
use crate::telemetry::metrics::{CACHE_EVENT_COUNT_NAME, CACHE_OPERATION_DURATION_NAME};
use crate::telemetry::CacheActivity;

/// Meter provider backed by an in-memory exporter.
#[derive(Debug)]
pub(crate) struct MetricTester {
    exporter: InMemoryMetricExporter,
    provider: SdkMeterProvider,
}

impl MetricTester {
    pub fn new() -> Self {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder().with_periodic_exporter(exporter.clone()).build();
        Self { exporter, provider }
    }

    pub fn meter_provider(&self) -> &SdkMeterProvider {
        &self.provider
    }

    /// Sum of `cache.event.count` over the data points recorded for `activity`.
    pub fn event_count(&self, activity: CacheActivity) -> u64 {
        let wanted = KeyValue::new(CACHE_ACTIVITY_NAME, activity.as_str());

        self.collect(CACHE_EVENT_COUNT_NAME, |metric| match metric.data() {
            AggregatedMetrics::U64(MetricData::Sum(sum)) => sum
                .data_points()
                .filter(|point| point.attributes().any(|attr| *attr == wanted))
                .map(|point| point.value())
                .collect(),
            _ => Vec::new(),
        })
        .into_iter()
        .sum()
    }

    /// Number of samples and their total in seconds in `cache.operation.duration`.
    pub fn durations(&self) -> (u64, f64) {
        self.collect(CACHE_OPERATION_DURATION_NAME, |metric| match metric.data() {
            AggregatedMetrics::F64(MetricData::Histogram(histogram)) => histogram
                .data_points()
                .map(|point| (point.count(), point.sum()))
                .collect(),
            _ => Vec::new(),
        })
        .into_iter()
        .fold((0, 0.0), |(count, total), (n, seconds)| (count + n, total + seconds))
    }

    /// All attributes attached to `cache.event.count` data points.
    pub fn event_attributes(&self) -> Vec<KeyValue> {
        self.collect(CACHE_EVENT_COUNT_NAME, |metric| match metric.data() {
            AggregatedMetrics::U64(MetricData::Sum(sum)) => {
                sum.data_points().flat_map(|point| point.attributes().cloned()).collect()
            }
            _ => Vec::new(),
        })
    }

    /// Flushes the provider and gathers `extract` over every exported metric named `name`.
    fn collect<T>(&self, name: &str, extract: impl Fn(&Metric) -> Vec<T>) -> Vec<T> {
        // Exports are cumulative; drop earlier snapshots so repeated reads don't double-count.
        self.exporter.reset();
        self.provider.force_flush().expect("metrics flush failed");
        self.exporter
            .get_finished_metrics()
            .expect("exporter holds finished metrics")
            .iter()
            .flat_map(ResourceMetrics::scope_metrics)
            .flat_map(|scope| scope.metrics())
            .filter(|metric| metric.name() == name)
            .flat_map(extract)
            .collect()
    }
}

/// Collects formatted `tracing` output for the scope of a `set_default` guard.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Number of captured lines containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.output().lines().filter(|line| line.contains(needle)).count()
    }

    pub fn assert_contains(&self, expected: &str) {
        let output = self.output();
        assert!(
            output.contains(expected),
            "log output does not contain '{expected}', got:\n{output}"
        );
    }

    pub fn subscriber(&self) -> impl tracing::Subscriber {
        let writer = self.clone();
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
