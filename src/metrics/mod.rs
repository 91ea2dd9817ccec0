//! Metric emission for the dispatch pipeline.
//!
//! The dispatcher only talks to a [`MetricsSink`]. Which sink is used is
//! decided at startup:
//!
//! - [`OtelMetrics`] pushes to an OpenTelemetry collector over OTLP/HTTP
//! - [`InMemoryMetrics`] keeps every sample in memory, used by tests
//! - [`NoopMetrics`] drops everything when `[metrics] enabled = false`

mod memory;
mod otel;

pub use memory::{InMemoryMetrics, TimerSample};
pub use otel::OtelMetrics;

use std::time::Duration;

/// Counter incremented for every payload taken off the bus
pub const NOTIFICATIONS_RECEIVED: &str = "notifications.received";

/// Timer recorded once per payload when its dispatch terminates
pub const NOTIFICATIONS_HANDLED: &str = "notifications.handled";

/// A metric tag as `(key, value)`
pub type Tag<'a> = (&'static str, &'a str);

/// Destination for counter and timer events
pub trait MetricsSink: Send + Sync {
    fn increment_counter(&self, name: &'static str, tags: &[Tag<'_>]);

    fn record_timer(&self, name: &'static str, elapsed: Duration, tags: &[Tag<'_>]);
}

/// Sink used when metric export is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment_counter(&self, _name: &'static str, _tags: &[Tag<'_>]) {}

    fn record_timer(&self, _name: &'static str, _elapsed: Duration, _tags: &[Tag<'_>]) {}
}
