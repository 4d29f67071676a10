//! Reporter Dispatch Tests - Composite Fan-out
//!
//! Uses mockall for the `SpanReporter` port to check that every
//! attached consumer sees each span exactly once, failures are
//! isolated, and the fan-out instruments itself through the factory.

use std::sync::Arc;

use chrono::Utc;
use mockall::mock;

use span_prometheus::adapters::metrics::{
    MetricRegistry, PrometheusMetricsFactory, PrometheusReporter,
};
use span_prometheus::adapters::reporting::{CompositeReporter, LoggingReporter, ReporterStats};
use span_prometheus::domain::span::{HTTP_METHOD, SPAN_KIND, Span};
use span_prometheus::ports::SpanReporter;
use span_prometheus::{MetricKind, MetricsError};

// ---- Mock Definitions ----

mock! {
    pub Reporter {}

    impl span_prometheus::ports::SpanReporter for Reporter {
        fn report_span(
            &self,
            span: &span_prometheus::domain::Span,
        ) -> span_prometheus::Result<()>;

        fn name(&self) -> &'static str;
    }
}

/// Reporter whose recording path panics.
struct Panicking;

impl SpanReporter for Panicking {
    fn report_span(&self, _span: &Span) -> span_prometheus::Result<()> {
        panic!("recorder bug");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

fn span(name: &str) -> Span {
    let now = Utc::now();
    Span::new(name, now, now)
}

fn ok_reporter(times: usize) -> MockReporter {
    let mut mock = MockReporter::new();
    mock.expect_report_span().times(times).returning(|_| Ok(()));
    mock.expect_name().return_const("ok");
    mock
}

// ---- Tests ----

#[test]
fn test_every_reporter_sees_each_span_once() {
    let composite = CompositeReporter::new(vec![
        Arc::new(ok_reporter(1)) as Arc<dyn SpanReporter>,
        Arc::new(ok_reporter(1)),
    ]);

    composite.report_span(&span("job")).unwrap();
}

#[test]
fn test_failure_does_not_stop_fan_out() {
    let mut failing = MockReporter::new();
    failing
        .expect_report_span()
        .times(1)
        .returning(|_| Err(MetricsError::EmptyName));
    failing.expect_name().return_const("failing");

    let composite = CompositeReporter::new(vec![
        Arc::new(failing) as Arc<dyn SpanReporter>,
        Arc::new(ok_reporter(1)),
    ]);

    assert!(composite.report_span(&span("job")).is_ok());
}

#[test]
fn test_contract_violation_is_isolated() {
    let mut violating = MockReporter::new();
    violating.expect_report_span().times(2).returning(|_| {
        Err(MetricsError::LabelShape {
            kind: MetricKind::Counter,
            name: "svc:requests".into(),
            expected: vec!["endpoint".into()],
            requested: vec!["route".into()],
        })
    });
    violating.expect_name().return_const("violating");

    let composite = CompositeReporter::new(vec![
        Arc::new(violating) as Arc<dyn SpanReporter>,
        Arc::new(ok_reporter(2)),
    ]);

    composite.report_span(&span("a")).unwrap();
    composite.report_span(&span("b")).unwrap();
}

#[test]
fn test_panicking_reporter_is_isolated() {
    let registry = Arc::new(MetricRegistry::new());
    let factory = PrometheusMetricsFactory::new("svc", Arc::clone(&registry));

    let composite = CompositeReporter::new(vec![
        Arc::new(Panicking) as Arc<dyn SpanReporter>,
        Arc::new(ok_reporter(2)),
    ])
    .with_stats(ReporterStats::new(&factory).unwrap());

    assert!(composite.report_span(&span("a")).is_ok());
    assert!(composite.report_span(&span("b")).is_ok());

    let spans = registry.find_counter("svc:reporter_spans").unwrap();
    assert!((spans.inner().with_label_values(&["ok"]).get() - 2.0).abs() < f64::EPSILON);
    assert!((spans.inner().with_label_values(&["err"]).get() - 2.0).abs() < f64::EPSILON);
}

#[test]
fn test_stats_count_deliveries_and_failures() {
    let registry = Arc::new(MetricRegistry::new());
    let factory = PrometheusMetricsFactory::new("svc", Arc::clone(&registry));

    let mut failing = MockReporter::new();
    failing
        .expect_report_span()
        .returning(|_| Err(MetricsError::EmptyName));
    failing.expect_name().return_const("failing");

    let composite = CompositeReporter::new(vec![
        Arc::new(ok_reporter(3)) as Arc<dyn SpanReporter>,
        Arc::new(failing),
    ])
    .with_stats(ReporterStats::new(&factory).unwrap());

    for _ in 0..3 {
        composite.report_span(&span("job")).unwrap();
    }

    let spans = registry.find_counter("svc:reporter_spans").unwrap();
    assert!((spans.inner().with_label_values(&["ok"]).get() - 3.0).abs() < f64::EPSILON);
    assert!((spans.inner().with_label_values(&["err"]).get() - 3.0).abs() < f64::EPSILON);

    let consumers = registry.find_gauge("svc:reporter_consumers").unwrap();
    assert!((consumers.inner().with_label_values(&[]).get() - 2.0).abs() < f64::EPSILON);

    let latency = registry.find_histogram("svc:reporter_latency").unwrap();
    assert_eq!(latency.inner().with_label_values(&[]).get_sample_count(), 3);
}

#[test]
fn test_push_updates_consumer_gauge() {
    let registry = Arc::new(MetricRegistry::new());
    let factory = PrometheusMetricsFactory::new("svc", Arc::clone(&registry));

    let mut composite =
        CompositeReporter::default().with_stats(ReporterStats::new(&factory).unwrap());
    assert!(composite.is_empty());
    composite.push(Arc::new(LoggingReporter));

    assert_eq!(composite.len(), 1);
    let consumers = registry.find_gauge("svc:reporter_consumers").unwrap();
    assert!((consumers.inner().with_label_values(&[]).get() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_composite_with_prometheus_and_logging() {
    let registry = Arc::new(MetricRegistry::new());
    let composite = CompositeReporter::new(vec![
        Arc::new(PrometheusReporter::new(&registry, "svc").unwrap()) as Arc<dyn SpanReporter>,
        Arc::new(LoggingReporter),
    ]);

    let s = span("GET /").with_tag(SPAN_KIND, "server").with_tag(HTTP_METHOD, "GET");
    composite.report_span(&s).unwrap();

    let requests = registry.find_counter("svc:requests").unwrap();
    assert!((requests.inner().with_label_values(&["GET-/", "false"]).get() - 1.0).abs() < f64::EPSILON);
}
