//! Finished span model.
//!
//! A `Span` is the read-only record a tracer hands over once a unit of
//! work completes: operation name, wall-clock start/end and an ordered
//! tag list. Tag values are optional; a tag carrying no value is a
//! first-class state and reads back as the empty string.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Tag key carrying the span role (`server`, `client`, ...).
pub const SPAN_KIND: &str = "span.kind";
/// `span.kind` value for inbound request spans.
pub const SPAN_KIND_SERVER: &str = "server";
/// Full request URL.
pub const HTTP_URL: &str = "http.url";
/// Request method.
pub const HTTP_METHOD: &str = "http.method";
/// Response status code.
pub const HTTP_STATUS_CODE: &str = "http.status_code";
/// Error marker.
pub const ERROR: &str = "error";

/// Scalar tag value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<&str> for TagValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for TagValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<bool> for TagValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for TagValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u16> for TagValue {
    fn from(v: u16) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for TagValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// A key with an optional value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub key: String,
    pub value: Option<TagValue>,
}

impl Tag {
    /// Tag with a value.
    pub fn new(key: impl Into<String>, value: impl Into<TagValue>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// Tag that carries a key only.
    pub fn bare(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }
}

/// A finished unit of traced work.
#[derive(Debug, Clone, Serialize)]
pub struct Span {
    pub operation_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub tags: Vec<Tag>,
}

impl Span {
    /// Create a span without tags.
    pub fn new(
        operation_name: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            operation_name: operation_name.into(),
            start_time,
            end_time,
            tags: Vec::new(),
        }
    }

    /// Append a tag (builder style).
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<TagValue>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    /// Append an already-built tag.
    #[must_use]
    pub fn with(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// First tag whose key matches.
    pub fn tag(&self, key: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.key == key)
    }

    /// Rendered value of the first matching tag, `""` when missing or valueless.
    ///
    /// A valueless first match does not fall through to later duplicates.
    pub fn tag_value(&self, key: &str) -> String {
        self.tag(key)
            .and_then(|t| t.value.as_ref())
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Wall-clock duration in seconds (microsecond precision).
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_seconds(&self) -> f64 {
        let elapsed = self.end_time.signed_duration_since(self.start_time);
        elapsed
            .num_microseconds()
            .map_or_else(|| elapsed.num_milliseconds() as f64 / 1e3, |us| us as f64 / 1e6)
    }
}
