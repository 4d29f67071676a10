//! Middleware Tests - Traced Router Behavior
//!
//! Drives a traced axum router with `tower::ServiceExt::oneshot` and
//! checks the server spans it reports.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use tower::ServiceExt;

use span_prometheus::adapters::http::traced_router;
use span_prometheus::adapters::metrics::{MetricRegistry, PrometheusReporter};
use span_prometheus::domain::span::{
    ERROR, HTTP_METHOD, HTTP_STATUS_CODE, HTTP_URL, SPAN_KIND, Span,
};
use span_prometheus::ports::SpanReporter;

/// Reporter that keeps every span it sees.
#[derive(Default)]
struct Capture {
    spans: Mutex<Vec<Span>>,
}

impl SpanReporter for Capture {
    fn report_span(&self, span: &Span) -> span_prometheus::Result<()> {
        self.spans.lock().unwrap().push(span.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "capture"
    }
}

fn app() -> Router {
    Router::new()
        .route("/users", get(|| async { "[]" }))
        .route("/fail", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
}

fn get_req(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_request_becomes_server_span() {
    let capture = Arc::new(Capture::default());
    let router = traced_router(app(), capture.clone(), Arc::new(MetricRegistry::new()));

    let resp = router.oneshot(get_req("/users?page=2")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let spans = capture.spans.lock().unwrap();
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.operation_name, "HTTP-GET-/users");
    assert_eq!(span.tag_value(SPAN_KIND), "server");
    assert_eq!(span.tag_value(HTTP_METHOD), "GET");
    assert_eq!(span.tag_value(HTTP_URL), "/users?page=2");
    assert_eq!(span.tag_value(HTTP_STATUS_CODE), "200");
    assert_eq!(span.tag_value(ERROR), "false");
    assert!(span.end_time >= span.start_time);
}

#[tokio::test]
async fn test_forwarded_proto_names_operation() {
    let capture = Arc::new(Capture::default());
    let router = traced_router(app(), capture.clone(), Arc::new(MetricRegistry::new()));

    let req = Request::get("/users")
        .header("x-forwarded-proto", "https")
        .body(Body::empty())
        .unwrap();
    router.oneshot(req).await.unwrap();

    let spans = capture.spans.lock().unwrap();
    assert_eq!(spans[0].operation_name, "HTTPS-GET-/users");
}

#[tokio::test]
async fn test_server_error_sets_error_tag() {
    let capture = Arc::new(Capture::default());
    let router = traced_router(app(), capture.clone(), Arc::new(MetricRegistry::new()));

    let resp = router.oneshot(get_req("/fail")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let spans = capture.spans.lock().unwrap();
    assert_eq!(spans[0].tag_value(ERROR), "true");
    assert_eq!(spans[0].tag_value(HTTP_STATUS_CODE), "500");
}

#[tokio::test]
async fn test_metrics_route_is_not_traced() {
    let capture = Arc::new(Capture::default());
    let router = traced_router(app(), capture.clone(), Arc::new(MetricRegistry::new()));

    let resp = router.oneshot(get_req("/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(capture.spans.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_traced_requests_reach_prometheus() {
    let registry = Arc::new(MetricRegistry::new());
    let reporter = Arc::new(PrometheusReporter::new(&registry, "web").unwrap());
    let router = traced_router(app(), reporter, Arc::clone(&registry));

    router.clone().oneshot(get_req("/users")).await.unwrap();
    router.oneshot(get_req("/fail")).await.unwrap();

    let codes = registry.find_counter("web:http_requests").unwrap();
    let ok = codes.inner().with_label_values(&["HTTP-GET-/users", "2xx"]).get();
    let failed = codes.inner().with_label_values(&["HTTP-GET-/fail", "5xx"]).get();
    assert!((ok - 1.0).abs() < f64::EPSILON);
    assert!((failed - 1.0).abs() < f64::EPSILON);

    let requests = registry.find_counter("web:requests").unwrap();
    let errors = requests.inner().with_label_values(&["HTTP-GET-/fail", "true"]).get();
    assert!((errors - 1.0).abs() < f64::EPSILON);
}
