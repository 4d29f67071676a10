//! Request Tracing Middleware - Inbound HTTP Requests as Server Spans
//!
//! Wraps a host application's axum router so each request produces one
//! finished server-kind span, reported synchronously once the inner
//! service has answered. `/metrics` is merged in after the layer and is
//! never traced itself.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use chrono::Utc;
use tracing::warn;

use crate::adapters::metrics::registry::MetricRegistry;
use crate::adapters::metrics::server::metrics_router;
use crate::domain::normalize::sanitize;
use crate::domain::span::{
    ERROR, HTTP_METHOD, HTTP_STATUS_CODE, HTTP_URL, SPAN_KIND, SPAN_KIND_SERVER, Span,
};
use crate::ports::reporter::SpanReporter;

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Request scheme: the absolute-form URI scheme if present, else the first
/// `X-Forwarded-Proto` entry set by a terminating proxy.
fn request_scheme(request: &Request) -> Option<&str> {
    request.uri().scheme_str().or_else(|| {
        request
            .headers()
            .get(X_FORWARDED_PROTO)?
            .to_str()
            .ok()?
            .split(',')
            .next()
            .map(str::trim)
            .filter(|proto| !proto.is_empty())
    })
}

/// Operation name for an inbound request: `"<SCHEME> <METHOD> <path>"`, sanitized.
pub fn operation_name(scheme: Option<&str>, method: &str, path: &str) -> String {
    let scheme = scheme.unwrap_or("http").to_ascii_uppercase();
    sanitize(&format!("{scheme} {} {path}", method.to_ascii_uppercase()))
}

/// Middleware body: time the inner service and report a server span.
pub async fn trace_request(
    State(reporter): State<Arc<dyn SpanReporter>>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Utc::now();
    let method = request.method().as_str().to_owned();
    let url = request.uri().to_string();
    let operation = operation_name(request_scheme(&request), &method, request.uri().path());

    let response = next.run(request).await;

    let status = response.status();
    let span = Span::new(operation, start_time, Utc::now())
        .with_tag(SPAN_KIND, SPAN_KIND_SERVER)
        .with_tag(HTTP_METHOD, method)
        .with_tag(HTTP_URL, url)
        .with_tag(HTTP_STATUS_CODE, status.as_u16())
        .with_tag(ERROR, status.is_server_error());

    if let Err(e) = reporter.report_span(&span) {
        warn!(reporter = reporter.name(), error = %e, "Request span dropped");
    }

    response
}

/// Trace every route of `app` and expose an untraced `/metrics`.
pub fn traced_router(
    app: Router,
    reporter: Arc<dyn SpanReporter>,
    registry: Arc<MetricRegistry>,
) -> Router {
    app.layer(middleware::from_fn_with_state(reporter, trace_request))
        .merge(metrics_router(registry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_name_defaults_scheme() {
        assert_eq!(operation_name(None, "get", "/users/42"), "HTTP-GET-/users/42");
        assert_eq!(operation_name(Some("https"), "POST", "/a b"), "HTTPS-POST-/a-b");
    }

    #[test]
    fn test_scheme_from_forwarded_proto() {
        let request = Request::get("/users")
            .header("X-Forwarded-Proto", "https, http")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(request_scheme(&request), Some("https"));

        let plain = Request::get("/users").body(axum::body::Body::empty()).unwrap();
        assert_eq!(request_scheme(&plain), None);

        let absolute = Request::get("https://svc.local/users")
            .header("X-Forwarded-Proto", "http")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(request_scheme(&absolute), Some("https"));
    }
}
