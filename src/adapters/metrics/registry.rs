//! Metric Vector Registry - Lazily Created Labeled Vectors
//!
//! Maps `(kind, fully-qualified name)` to a Prometheus metric vector,
//! constructing and registering it on first request. Each kind has its
//! own sharded concurrent map: lookups of existing vectors only take a
//! shard read lock, and first-time creation goes through the map's
//! entry API so racing callers construct exactly one vector.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use prometheus::core::Collector;
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use tracing::debug;

use crate::error::{MetricKind, MetricsError, Result};

/// Fixed latency buckets in seconds. The `+Inf` bucket is implicit.
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// A registered vector with its immutable label shape.
pub struct Vector<M> {
    name: String,
    label_names: Vec<String>,
    inner: M,
}

impl<M> fmt::Debug for Vector<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("name", &self.name)
            .field("label_names", &self.label_names)
            .finish_non_exhaustive()
    }
}

pub type CounterVector = Arc<Vector<CounterVec>>;
pub type HistogramVector = Arc<Vector<HistogramVec>>;
pub type GaugeVector = Arc<Vector<GaugeVec>>;

impl<M> Vector<M> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// The underlying Prometheus vector.
    pub const fn inner(&self) -> &M {
        &self.inner
    }

    fn has_shape(&self, label_names: &[&str]) -> bool {
        self.label_names
            .iter()
            .map(String::as_str)
            .eq(label_names.iter().copied())
    }

    fn check_values(&self, values: &[&str]) -> Result<()> {
        if values.len() == self.label_names.len() {
            Ok(())
        } else {
            Err(MetricsError::LabelValueCount {
                name: self.name.clone(),
                expected: self.label_names.len(),
                got: values.len(),
            })
        }
    }
}

impl Vector<CounterVec> {
    /// Add `amount` to the series for `values`.
    pub fn increment(&self, values: &[&str], amount: f64) -> Result<()> {
        self.check_values(values)?;
        if !amount.is_finite() {
            return Err(MetricsError::NonFinite {
                kind: MetricKind::Counter,
                name: self.name.clone(),
                value: amount,
            });
        }
        if amount < 0.0 {
            return Err(MetricsError::NegativeIncrement {
                name: self.name.clone(),
                amount,
            });
        }
        self.inner.get_metric_with_label_values(values)?.inc_by(amount);
        Ok(())
    }
}

impl Vector<HistogramVec> {
    /// Observe `value` into the series for `values`.
    pub fn observe(&self, values: &[&str], value: f64) -> Result<()> {
        self.check_values(values)?;
        if !value.is_finite() {
            return Err(MetricsError::NonFinite {
                kind: MetricKind::Histogram,
                name: self.name.clone(),
                value,
            });
        }
        self.inner.get_metric_with_label_values(values)?.observe(value);
        Ok(())
    }
}

impl Vector<GaugeVec> {
    /// Overwrite the series for `values` with `value`.
    pub fn set(&self, values: &[&str], value: f64) -> Result<()> {
        self.check_values(values)?;
        self.inner.get_metric_with_label_values(values)?.set(value);
        Ok(())
    }
}

/// One kind's name→vector namespace.
struct Family<M> {
    kind: MetricKind,
    vectors: DashMap<String, Arc<Vector<M>>>,
    constructed: AtomicUsize,
}

impl<M> Family<M> {
    fn new(kind: MetricKind) -> Self {
        Self {
            kind,
            vectors: DashMap::new(),
            constructed: AtomicUsize::new(0),
        }
    }

    fn shape_error(&self, existing: &Vector<M>, requested: &[&str]) -> MetricsError {
        MetricsError::LabelShape {
            kind: self.kind,
            name: existing.name.clone(),
            expected: existing.label_names.clone(),
            requested: requested.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    fn resolve(&self, existing: &Arc<Vector<M>>, label_names: &[&str]) -> Result<Arc<Vector<M>>> {
        if existing.has_shape(label_names) {
            Ok(Arc::clone(existing))
        } else {
            Err(self.shape_error(existing, label_names))
        }
    }

    fn get_or_create<F>(&self, name: &str, label_names: &[&str], build: F) -> Result<Arc<Vector<M>>>
    where
        F: FnOnce() -> Result<M>,
    {
        if name.is_empty() {
            return Err(MetricsError::EmptyName);
        }

        // Fast path: shard read lock only.
        if let Some(existing) = self.vectors.get(name) {
            return self.resolve(existing.value(), label_names);
        }

        // Slow path: the entry holds the shard write lock, so a racing
        // creator either sees our vector or we see theirs.
        match self.vectors.entry(name.to_owned()) {
            Entry::Occupied(slot) => self.resolve(slot.get(), label_names),
            Entry::Vacant(slot) => {
                let vector = Arc::new(Vector {
                    name: name.to_owned(),
                    label_names: label_names.iter().map(|s| (*s).to_owned()).collect(),
                    inner: build()?,
                });
                slot.insert(Arc::clone(&vector));
                self.constructed.fetch_add(1, Ordering::Relaxed);
                debug!(kind = %self.kind, name, labels = ?label_names, "Metric vector created");
                Ok(vector)
            }
        }
    }

    fn get(&self, name: &str) -> Option<Arc<Vector<M>>> {
        self.vectors.get(name).map(|v| Arc::clone(v.value()))
    }

    fn constructed(&self) -> usize {
        self.constructed.load(Ordering::Relaxed)
    }
}

/// Registry of labeled vectors, one namespace per metric kind.
///
/// Owns the Prometheus `Registry` every vector is exported through;
/// a vector becomes scrapeable as soon as its creation returns.
pub struct MetricRegistry {
    /// Prometheus registry.
    registry: Registry,
    counters: Family<CounterVec>,
    histograms: Family<HistogramVec>,
    gauges: Family<GaugeVec>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricRegistry {
    /// Create an empty registry backed by a fresh Prometheus registry.
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    /// Wrap an existing Prometheus registry (e.g. one shared with other exporters).
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            counters: Family::new(MetricKind::Counter),
            histograms: Family::new(MetricKind::Histogram),
            gauges: Family::new(MetricKind::Gauge),
        }
    }

    fn register<C: Collector + Clone + 'static>(&self, collector: &C) -> Result<()> {
        self.registry.register(Box::new(collector.clone()))?;
        Ok(())
    }

    /// Get or create the counter vector `name` with `label_names`.
    pub fn counter(&self, name: &str, label_names: &[&str]) -> Result<CounterVector> {
        self.counters.get_or_create(name, label_names, || {
            let vec = CounterVec::new(Opts::new(name, name), label_names)?;
            self.register(&vec)?;
            Ok(vec)
        })
    }

    /// Get or create the histogram vector `name` with `label_names`.
    pub fn histogram(&self, name: &str, label_names: &[&str]) -> Result<HistogramVector> {
        self.histograms.get_or_create(name, label_names, || {
            let vec = HistogramVec::new(
                HistogramOpts::new(name, name).buckets(LATENCY_BUCKETS.to_vec()),
                label_names,
            )?;
            self.register(&vec)?;
            Ok(vec)
        })
    }

    /// Get or create the gauge vector `name` with `label_names`.
    pub fn gauge(&self, name: &str, label_names: &[&str]) -> Result<GaugeVector> {
        self.gauges.get_or_create(name, label_names, || {
            let vec = GaugeVec::new(Opts::new(name, name), label_names)?;
            self.register(&vec)?;
            Ok(vec)
        })
    }

    /// Existing counter vector, if any.
    pub fn find_counter(&self, name: &str) -> Option<CounterVector> {
        self.counters.get(name)
    }

    /// Existing histogram vector, if any.
    pub fn find_histogram(&self, name: &str) -> Option<HistogramVector> {
        self.histograms.get(name)
    }

    /// Existing gauge vector, if any.
    pub fn find_gauge(&self, name: &str) -> Option<GaugeVector> {
        self.gauges.get(name)
    }

    /// Number of vectors constructed so far, across all kinds.
    pub fn vectors_created(&self) -> usize {
        self.counters.constructed() + self.histograms.constructed() + self.gauges.constructed()
    }

    /// The backing Prometheus registry.
    pub const fn prometheus(&self) -> &Registry {
        &self.registry
    }

    /// Render every registered vector in the Prometheus text format.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
