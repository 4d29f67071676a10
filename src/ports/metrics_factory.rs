//! Metrics Factory Port - Generic Metric Creation Interface
//!
//! The tracer's own instrumentation asks for counters, timers and
//! gauges by name and tag map, and receives a sink it can feed values
//! into. The port knows nothing about the backing metrics system.

use crate::domain::tags::Tags;
use crate::error::Result;

/// A bound metric: one vector plus one fixed label-value tuple.
pub trait MetricSink: Send + Sync {
    /// Feed one value (increment, observation or new level).
    fn record(&self, value: f64);
}

/// Trait for metric backends.
///
/// Same name with the same tag key set always resolves to the same
/// underlying vector; a different key set for an existing name is a
/// contract violation and returns an error.
pub trait MetricsFactory: Send + Sync + 'static {
    /// Monotonic counter; `record` adds to it.
    fn create_counter(&self, name: &str, tags: &Tags) -> Result<Box<dyn MetricSink>>;

    /// Duration histogram; `record` observes seconds.
    fn create_timer(&self, name: &str, tags: &Tags) -> Result<Box<dyn MetricSink>>;

    /// Gauge; `record` sets the current value.
    fn create_gauge(&self, name: &str, tags: &Tags) -> Result<Box<dyn MetricSink>>;
}
