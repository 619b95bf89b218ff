//! Metrics sink backed by the `metrics` facade.
//!
//! The crate only emits; recorder installation (Prometheus exporter,
//! statsd, ...) belongs to whoever embeds the binary. Without a recorder
//! every observation is a cheap no-op.

use metrics::Label;

use crate::port::{Labels, MetricsSink};

/// Forwards observations to the globally installed `metrics` recorder.
pub struct RuntimeMetrics;

impl RuntimeMetrics {
    fn labels(labels: Labels) -> Vec<Label> {
        labels
            .into_iter()
            .map(|(key, value)| Label::new(key, value))
            .collect()
    }
}

impl MetricsSink for RuntimeMetrics {
    fn inc_counter(&self, name: &'static str, labels: Labels) {
        metrics::counter!(name, Self::labels(labels)).increment(1);
    }

    fn set_gauge(&self, name: &'static str, labels: Labels, value: f64) {
        metrics::gauge!(name, Self::labels(labels)).set(value);
    }
}
