//! OTLP metrics exporter

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram, Meter, MeterProvider};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};

use super::{MetricsSink, Tag};
use crate::config::MetricsConfig;
use crate::error::{AppError, AppResult};

/// Histogram bucket boundaries for timers, in seconds
const LATENCY_BOUNDARIES: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// OpenTelemetry-backed sink
///
/// Instruments are created lazily on first use and cached by metric name.
/// Timers are `f64` histograms in seconds.
#[derive(Clone)]
pub struct OtelMetrics {
    provider: SdkMeterProvider,
    meter: Meter,
    counters: Arc<DashMap<&'static str, Counter<u64>>>,
    timers: Arc<DashMap<&'static str, Histogram<f64>>>,
}

impl OtelMetrics {
    /// Push metrics to the configured OTLP/HTTP endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the OTLP exporter cannot be built.
    pub fn init(config: &MetricsConfig) -> AppResult<Self> {
        tracing::info!(
            endpoint = %config.endpoint,
            interval_secs = config.export_interval_secs,
            "Initializing OpenTelemetry metrics with OTLP exporter"
        );

        let exporter = opentelemetry_otlp::MetricExporter::builder()
            .with_http()
            .with_endpoint(config.endpoint.clone())
            .build()
            .map_err(|e| AppError::Metrics {
                message: e.to_string(),
            })?;

        let reader = PeriodicReader::builder(exporter)
            .with_interval(config.export_interval())
            .build();

        Ok(Self::with_provider(
            SdkMeterProvider::builder().with_reader(reader).build(),
        ))
    }

    /// Wrap an already configured meter provider
    pub fn with_provider(provider: SdkMeterProvider) -> Self {
        let meter = provider.meter("notifier");
        Self {
            provider,
            meter,
            counters: Arc::new(DashMap::new()),
            timers: Arc::new(DashMap::new()),
        }
    }

    /// Flush pending data points and stop the exporter
    pub fn shutdown(&self) -> AppResult<()> {
        self.provider.shutdown().map_err(|e| AppError::Metrics {
            message: e.to_string(),
        })
    }

    fn counter(&self, name: &'static str) -> Counter<u64> {
        self.counters
            .entry(name)
            .or_insert_with(|| self.meter.u64_counter(name).build())
            .clone()
    }

    fn timer(&self, name: &'static str) -> Histogram<f64> {
        self.timers
            .entry(name)
            .or_insert_with(|| {
                self.meter
                    .f64_histogram(name)
                    .with_unit("s")
                    .with_boundaries(LATENCY_BOUNDARIES.to_vec())
                    .build()
            })
            .clone()
    }
}

fn attributes(tags: &[Tag<'_>]) -> Vec<KeyValue> {
    tags.iter()
        .map(|(key, value)| KeyValue::new(*key, value.to_string()))
        .collect()
}

impl MetricsSink for OtelMetrics {
    fn increment_counter(&self, name: &'static str, tags: &[Tag<'_>]) {
        self.counter(name).add(1, &attributes(tags));
    }

    fn record_timer(&self, name: &'static str, elapsed: Duration, tags: &[Tag<'_>]) {
        self.timer(name)
            .record(elapsed.as_secs_f64(), &attributes(tags));
    }
}
