//! Metrics Adapters
//!
//! Prometheus-backed implementations: the lazily populated vector
//! registry, the tag-map metrics factory, the span recorders and the
//! `/metrics` exposition server with its health probes.

pub mod factory;
pub mod recorder;
pub mod registry;
pub mod reporter;
pub mod server;

pub use factory::PrometheusMetricsFactory;
pub use registry::{LATENCY_BUCKETS, MetricRegistry};
pub use reporter::PrometheusReporter;
pub use server::HealthState;
