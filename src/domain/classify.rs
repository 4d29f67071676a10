//! Span classification and HTTP tag extraction.
//!
//! Decides whether a finished span is an inbound HTTP request or a
//! generic operation, and derives the label values the HTTP recorder
//! binds. Anything that is not clearly an HTTP server span falls
//! through to `Operation`.

use super::normalize::sanitize;
use super::span::{ERROR, HTTP_METHOD, HTTP_STATUS_CODE, HTTP_URL, SPAN_KIND, SPAN_KIND_SERVER, Span};

/// Endpoint label used when the operation name sanitizes to nothing.
pub const UNKNOWN_ENDPOINT: &str = "other";

/// Recording shape of a finished span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanShape {
    HttpServer,
    Operation,
}

impl SpanShape {
    /// Classify a span: server kind plus a URL or method tag means HTTP.
    pub fn of(span: &Span) -> Self {
        let is_server = span.tag_value(SPAN_KIND) == SPAN_KIND_SERVER;
        let is_http =
            !span.tag_value(HTTP_URL).is_empty() || !span.tag_value(HTTP_METHOD).is_empty();

        if is_server && is_http {
            Self::HttpServer
        } else {
            Self::Operation
        }
    }
}

/// Label values extracted from an HTTP server span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOutcome {
    pub endpoint: String,
    pub status_code: i64,
    pub error: bool,
}

impl HttpOutcome {
    /// Extract endpoint, status code and error flag.
    pub fn from_span(span: &Span, normalize: fn(&str) -> String) -> Self {
        let mut endpoint = normalize(&span.operation_name);
        if endpoint.is_empty() {
            endpoint = UNKNOWN_ENDPOINT.to_owned();
        }

        let status_code = span.tag_value(HTTP_STATUS_CODE).trim().parse().unwrap_or(0);

        let error = span.tag_value(ERROR);
        let error = !error.is_empty() && !error.eq_ignore_ascii_case("false");

        Self {
            endpoint,
            status_code,
            error,
        }
    }

    /// Same as [`from_span`](Self::from_span) with the default normalizer.
    pub fn of(span: &Span) -> Self {
        Self::from_span(span, sanitize)
    }

    /// Hundreds digit of the status code.
    pub const fn status_class(&self) -> i64 {
        self.status_code / 100
    }

    /// `"2xx"`..`"5xx"`; `None` for any other class (1xx, missing, garbage).
    pub fn status_bucket(&self) -> Option<String> {
        let class = self.status_class();
        (2..=5).contains(&class).then(|| format!("{class}xx"))
    }

    /// `"true"` / `"false"` label value.
    pub const fn error_label(&self) -> &'static str {
        if self.error { "true" } else { "false" }
    }
}
