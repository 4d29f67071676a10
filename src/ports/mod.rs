//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Interfaces the span-to-metrics core exposes to tracers and
//! instrumentation. Adapters implement these traits.
//!
//! Port categories:
//! - `SpanReporter`: consumer of finished spans
//! - `MetricsFactory`: tag-map counter/timer/gauge creation

pub mod metrics_factory;
pub mod reporter;

pub use metrics_factory::{MetricSink, MetricsFactory};
pub use reporter::{NullReporter, SpanReporter};
