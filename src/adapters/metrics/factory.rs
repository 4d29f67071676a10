//! Prometheus Metrics Factory - Tag-Map Metrics over the Vector Registry
//!
//! Adapts the generic `MetricsFactory` port onto `MetricRegistry`.
//! Default tags are merged under call tags, the merged keys become the
//! sorted label names, and the returned sink carries the matching value
//! tuple so every `record` lands on the same series.

use std::sync::Arc;

use tracing::warn;

use crate::adapters::metrics::registry::{CounterVector, GaugeVector, HistogramVector, MetricRegistry};
use crate::domain::normalize::{identifier, qualify};
use crate::domain::tags::{TagSet, Tags};
use crate::error::Result;
use crate::ports::metrics_factory::{MetricSink, MetricsFactory};

/// Label-value tuple captured at sink creation.
#[derive(Debug, Clone)]
struct BoundValues(Vec<String>);

impl BoundValues {
    fn as_refs(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }
}

/// Counter sink.
#[derive(Debug)]
pub struct BoundCounter {
    vector: CounterVector,
    values: BoundValues,
}

impl MetricSink for BoundCounter {
    fn record(&self, value: f64) {
        if let Err(e) = self.vector.increment(&self.values.as_refs(), value) {
            warn!(metric = %self.vector.name(), error = %e, "Counter update dropped");
        }
    }
}

/// Timer (histogram) sink.
#[derive(Debug)]
pub struct BoundTimer {
    vector: HistogramVector,
    values: BoundValues,
}

impl MetricSink for BoundTimer {
    fn record(&self, value: f64) {
        if let Err(e) = self.vector.observe(&self.values.as_refs(), value) {
            warn!(metric = %self.vector.name(), error = %e, "Timer observation dropped");
        }
    }
}

/// Gauge sink.
#[derive(Debug)]
pub struct BoundGauge {
    vector: GaugeVector,
    values: BoundValues,
}

impl MetricSink for BoundGauge {
    fn record(&self, value: f64) {
        if let Err(e) = self.vector.set(&self.values.as_refs(), value) {
            warn!(metric = %self.vector.name(), error = %e, "Gauge update dropped");
        }
    }
}

/// `MetricsFactory` backed by a shared `MetricRegistry`.
pub struct PrometheusMetricsFactory {
    /// Prefix for every metric name.
    namespace: String,
    /// Service-wide constant labels.
    tags: TagSet,
    /// Shared vector registry.
    registry: Arc<MetricRegistry>,
}

impl PrometheusMetricsFactory {
    /// Create a factory without default tags.
    pub fn new(namespace: impl Into<String>, registry: Arc<MetricRegistry>) -> Self {
        Self::with_tags(namespace, registry, Tags::new())
    }

    /// Create a factory whose metrics all carry `tags` unless a call overrides them.
    pub fn with_tags(
        namespace: impl Into<String>,
        registry: Arc<MetricRegistry>,
        tags: Tags,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            tags: TagSet::new(tags),
            registry,
        }
    }

    /// Fully-qualified, identifier-safe vector name.
    pub fn key_name(&self, name: &str) -> String {
        identifier(&qualify(name, &self.namespace))
    }

    fn resolve<V>(
        &self,
        name: &str,
        tags: &Tags,
        get_or_create: impl FnOnce(&MetricRegistry, &str, &[&str]) -> Result<V>,
    ) -> Result<(V, BoundValues)> {
        let labels = self.tags.labels(tags);
        let vector = get_or_create(&self.registry, &self.key_name(name), &labels.names())?;
        Ok((vector, BoundValues(labels.into_values())))
    }

    pub fn registry(&self) -> &Arc<MetricRegistry> {
        &self.registry
    }
}

impl MetricsFactory for PrometheusMetricsFactory {
    fn create_counter(&self, name: &str, tags: &Tags) -> Result<Box<dyn MetricSink>> {
        let (vector, values) = self.resolve(name, tags, MetricRegistry::counter)?;
        Ok(Box::new(BoundCounter { vector, values }))
    }

    fn create_timer(&self, name: &str, tags: &Tags) -> Result<Box<dyn MetricSink>> {
        let (vector, values) = self.resolve(name, tags, MetricRegistry::histogram)?;
        Ok(Box::new(BoundTimer { vector, values }))
    }

    fn create_gauge(&self, name: &str, tags: &Tags) -> Result<Box<dyn MetricSink>> {
        let (vector, values) = self.resolve(name, tags, MetricRegistry::gauge)?;
        Ok(Box::new(BoundGauge { vector, values }))
    }
}
