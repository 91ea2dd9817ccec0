//! In-process sink that keeps every event for inspection.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use dashmap::DashMap;

use super::{MetricsSink, Tag};

type Tags = BTreeMap<String, String>;

/// One recorded timer observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSample {
    pub name: String,
    pub elapsed: Duration,
    pub tags: Tags,
}

impl TimerSample {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    fn matches(&self, name: &str, tags: &[(&str, &str)]) -> bool {
        self.name == name && tags.iter().all(|(k, v)| self.tag(k) == Some(*v))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    counters: DashMap<(String, Tags), u64>,
    timers: Mutex<Vec<TimerSample>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of a counter across all tag combinations
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .iter()
            .filter(|entry| entry.key().0 == name)
            .map(|entry| *entry.value())
            .sum()
    }

    /// Every sample recorded for `name`, in recording order
    pub fn timer_samples(&self, name: &str) -> Vec<TimerSample> {
        self.timers
            .lock()
            .map(|samples| samples.iter().filter(|s| s.name == name).cloned().collect())
            .unwrap_or_default()
    }

    /// Number of samples for `name` carrying at least the given tags
    pub fn timer_count(&self, name: &str, tags: &[(&str, &str)]) -> usize {
        self.timers
            .lock()
            .map(|samples| samples.iter().filter(|s| s.matches(name, tags)).count())
            .unwrap_or_default()
    }
}

fn owned(tags: &[Tag<'_>]) -> Tags {
    tags.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl MetricsSink for InMemoryMetrics {
    fn increment_counter(&self, name: &'static str, tags: &[Tag<'_>]) {
        *self
            .counters
            .entry((name.to_string(), owned(tags)))
            .or_insert(0) += 1;
    }

    fn record_timer(&self, name: &'static str, elapsed: Duration, tags: &[Tag<'_>]) {
        if let Ok(mut samples) = self.timers.lock() {
            samples.push(TimerSample {
                name: name.to_string(),
                elapsed,
                tags: owned(tags),
            });
        }
    }
}
