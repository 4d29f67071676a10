//! Span Recorders - HTTP and Operation Span Metrics
//!
//! `HttpMetrics` feeds request count, latency and status-class counters
//! from inbound HTTP server spans. `OperationMetrics` feeds a single
//! per-operation latency histogram from everything else. Both resolve
//! their vectors from the shared registry once, at construction.

use crate::adapters::metrics::registry::{CounterVector, HistogramVector, MetricRegistry};
use crate::domain::classify::HttpOutcome;
use crate::domain::normalize::qualify;
use crate::domain::span::Span;
use crate::error::Result;

pub const METRIC_OPERATIONS: &str = "operations";
pub const METRIC_HTTP_REQUESTS: &str = "requests";
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "request_latency";
pub const METRIC_HTTP_STATUS_CODES: &str = "http_requests";

pub const LABEL_ENDPOINT: &str = "endpoint";
pub const LABEL_ERROR: &str = "error";
pub const LABEL_STATUS_CODE: &str = "status_code";
pub const LABEL_NAME: &str = "name";

/// Normalizer applied to operation names before they become label values.
pub type Normalize = fn(&str) -> String;

/// Metrics recorded for HTTP server spans.
#[derive(Debug, Clone)]
pub struct HttpMetrics {
    /// `requests{endpoint, error}`.
    requests: CounterVector,
    /// `request_latency{endpoint, error}` in seconds.
    latency: HistogramVector,
    /// `http_requests{endpoint, status_code}`; 2xx..5xx only.
    status_codes: CounterVector,
    normalize: Normalize,
}

impl HttpMetrics {
    /// Resolve the three HTTP vectors under `namespace`.
    pub fn new(registry: &MetricRegistry, namespace: &str, normalize: Normalize) -> Result<Self> {
        Ok(Self {
            requests: registry.counter(
                &qualify(METRIC_HTTP_REQUESTS, namespace),
                &[LABEL_ENDPOINT, LABEL_ERROR],
            )?,
            latency: registry.histogram(
                &qualify(METRIC_HTTP_REQUEST_LATENCY, namespace),
                &[LABEL_ENDPOINT, LABEL_ERROR],
            )?,
            status_codes: registry.counter(
                &qualify(METRIC_HTTP_STATUS_CODES, namespace),
                &[LABEL_ENDPOINT, LABEL_STATUS_CODE],
            )?,
            normalize,
        })
    }

    /// Record one HTTP server span.
    pub fn record(&self, span: &Span) -> Result<()> {
        let outcome = HttpOutcome::from_span(span, self.normalize);
        let labels = [outcome.endpoint.as_str(), outcome.error_label()];

        self.requests.increment(&labels, 1.0)?;
        self.latency.observe(&labels, span.duration_seconds())?;

        // Only 2xx..5xx are bucketed.
        if let Some(bucket) = outcome.status_bucket() {
            self.status_codes
                .increment(&[outcome.endpoint.as_str(), bucket.as_str()], 1.0)?;
        }
        Ok(())
    }
}

/// Latency histogram for non-HTTP spans.
#[derive(Debug, Clone)]
pub struct OperationMetrics {
    /// `operations{name}` in seconds.
    operations: HistogramVector,
    normalize: Normalize,
}

impl OperationMetrics {
    pub fn new(registry: &MetricRegistry, namespace: &str, normalize: Normalize) -> Result<Self> {
        Ok(Self {
            operations: registry.histogram(&qualify(METRIC_OPERATIONS, namespace), &[LABEL_NAME])?,
            normalize,
        })
    }

    pub fn record(&self, span: &Span) -> Result<()> {
        let name = (self.normalize)(&span.operation_name);
        self.operations.observe(&[name.as_str()], span.duration_seconds())
    }
}
