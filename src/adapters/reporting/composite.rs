//! Composite Reporter - Span Fan-out with Failure Isolation
//!
//! Forwards each finished span to every attached reporter in order. A
//! failing or panicking reporter is logged and skipped; the remaining
//! reporters still see the span and the caller never sees the error.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, warn};

use crate::domain::span::Span;
use crate::domain::tags::tags;
use crate::error::Result;
use crate::ports::metrics_factory::{MetricSink, MetricsFactory};
use crate::ports::reporter::SpanReporter;

/// Self-instrumentation of the fan-out, created through a `MetricsFactory`.
pub struct ReporterStats {
    /// Successful deliveries.
    delivered: Box<dyn MetricSink>,
    /// Failed deliveries.
    failed: Box<dyn MetricSink>,
    /// Fan-out duration in seconds.
    latency: Box<dyn MetricSink>,
    /// Number of attached reporters.
    consumers: Box<dyn MetricSink>,
}

impl ReporterStats {
    pub fn new(factory: &dyn MetricsFactory) -> Result<Self> {
        Ok(Self {
            delivered: factory.create_counter("reporter_spans", &tags([("result", "ok")]))?,
            failed: factory.create_counter("reporter_spans", &tags([("result", "err")]))?,
            latency: factory.create_timer("reporter_latency", &tags([]))?,
            consumers: factory.create_gauge("reporter_consumers", &tags([]))?,
        })
    }
}

/// Reporter that fans spans out to several others.
#[derive(Default)]
pub struct CompositeReporter {
    reporters: Vec<Arc<dyn SpanReporter>>,
    stats: Option<ReporterStats>,
}

impl CompositeReporter {
    pub fn new(reporters: Vec<Arc<dyn SpanReporter>>) -> Self {
        Self {
            reporters,
            stats: None,
        }
    }

    /// Attach self-instrumentation.
    #[must_use]
    pub fn with_stats(mut self, stats: ReporterStats) -> Self {
        #[allow(clippy::cast_precision_loss)]
        stats.consumers.record(self.reporters.len() as f64);
        self.stats = Some(stats);
        self
    }

    /// Append another reporter.
    pub fn push(&mut self, reporter: Arc<dyn SpanReporter>) {
        self.reporters.push(reporter);
        if let Some(stats) = &self.stats {
            #[allow(clippy::cast_precision_loss)]
            stats.consumers.record(self.reporters.len() as f64);
        }
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }

    fn record_failure(&self) {
        if let Some(stats) = &self.stats {
            stats.failed.record(1.0);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl SpanReporter for CompositeReporter {
    fn report_span(&self, span: &Span) -> Result<()> {
        let started = Instant::now();

        for reporter in &self.reporters {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| reporter.report_span(span)));
            match outcome {
                Ok(Ok(())) => {
                    if let Some(stats) = &self.stats {
                        stats.delivered.record(1.0);
                    }
                }
                Ok(Err(e)) => {
                    if e.is_contract_violation() {
                        error!(
                            reporter = reporter.name(),
                            operation = %span.operation_name,
                            error = %e,
                            "Span reporter contract violation"
                        );
                    } else {
                        warn!(
                            reporter = reporter.name(),
                            operation = %span.operation_name,
                            error = %e,
                            "Span reporter failed"
                        );
                    }
                    self.record_failure();
                }
                Err(payload) => {
                    error!(
                        reporter = reporter.name(),
                        operation = %span.operation_name,
                        panic = panic_message(payload.as_ref()),
                        "Span reporter panicked"
                    );
                    self.record_failure();
                }
            }
        }

        if let Some(stats) = &self.stats {
            stats.latency.record(started.elapsed().as_secs_f64());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "composite"
    }
}
