//! Prometheus Span Reporter - Span Classification to Metrics
//!
//! Receives every finished span, classifies it as an HTTP server span
//! or a generic operation, and hands it to the matching recorder. All
//! vectors are namespaced by the owning service's name.

use tracing::trace;

use crate::adapters::metrics::recorder::{HttpMetrics, Normalize, OperationMetrics};
use crate::adapters::metrics::registry::MetricRegistry;
use crate::domain::classify::SpanShape;
use crate::domain::normalize::sanitize;
use crate::domain::span::Span;
use crate::error::Result;
use crate::ports::reporter::SpanReporter;

/// Span reporter that records into Prometheus vectors.
#[derive(Debug, Clone)]
pub struct PrometheusReporter {
    http: HttpMetrics,
    operations: OperationMetrics,
}

impl PrometheusReporter {
    /// Reporter with the default `sanitize` normalizer.
    pub fn new(registry: &MetricRegistry, namespace: &str) -> Result<Self> {
        Self::with_normalizer(registry, namespace, sanitize)
    }

    /// Reporter with a custom operation-name normalizer.
    pub fn with_normalizer(
        registry: &MetricRegistry,
        namespace: &str,
        normalize: Normalize,
    ) -> Result<Self> {
        Ok(Self {
            http: HttpMetrics::new(registry, namespace, normalize)?,
            operations: OperationMetrics::new(registry, namespace, normalize)?,
        })
    }
}

impl SpanReporter for PrometheusReporter {
    fn report_span(&self, span: &Span) -> Result<()> {
        let shape = SpanShape::of(span);
        trace!(operation = %span.operation_name, ?shape, "Recording span");

        match shape {
            SpanShape::HttpServer => self.http.record(span),
            SpanShape::Operation => self.operations.record(span),
        }
    }

    fn name(&self) -> &'static str {
        "prometheus"
    }
}
