//! Metrics port.
//!
//! Fire-and-forget counters and gauges. Emission must never fail or block
//! the caller; a sink that cannot record simply drops the observation.

/// Label set attached to a metric observation.
pub type Labels = Vec<(&'static str, String)>;

/// Sink for operational metrics.
pub trait MetricsSink: Send + Sync {
    /// Increment a counter by one.
    fn inc_counter(&self, name: &'static str, labels: Labels);

    /// Set a gauge to an absolute value.
    fn set_gauge(&self, name: &'static str, labels: Labels, value: f64);
}

/// A no-op sink for tests or when metrics are disabled.
pub struct NullMetrics;

impl MetricsSink for NullMetrics {
    fn inc_counter(&self, _name: &'static str, _labels: Labels) {}

    fn set_gauge(&self, _name: &'static str, _labels: Labels, _value: f64) {}
}

/// A sink that logs observations via tracing, for local runs.
pub struct LogMetrics;

impl MetricsSink for LogMetrics {
    fn inc_counter(&self, name: &'static str, labels: Labels) {
        tracing::debug!(metric = name, ?labels, "counter +1");
    }

    fn set_gauge(&self, name: &'static str, labels: Labels, value: f64) {
        tracing::debug!(metric = name, ?labels, value, "gauge set");
    }
}
