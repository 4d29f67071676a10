//! Metrics Error Types
//!
//! Typed failures surfaced by the registry, the factory and the span
//! recorders. Contract violations (label shape / label count) are
//! programming errors and are reported as such; everything else is a
//! recoverable runtime condition.

use std::fmt;

use thiserror::Error;

/// Kind of a labeled metric vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Monotonic sum.
    Counter,
    /// Bucketed distribution.
    Histogram,
    /// Last written value.
    Gauge,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Counter => "counter",
            Self::Histogram => "histogram",
            Self::Gauge => "gauge",
        })
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors produced by the metrics core.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metric name is empty after qualification")]
    EmptyName,

    #[error(
        "{kind} `{name}` was registered with labels {expected:?}, requested with {requested:?}"
    )]
    LabelShape {
        kind: MetricKind,
        name: String,
        expected: Vec<String>,
        requested: Vec<String>,
    },

    #[error("`{name}` expects {expected} label values, got {got}")]
    LabelValueCount {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("counter `{name}` cannot be incremented by negative amount {amount}")]
    NegativeIncrement { name: String, amount: f64 },

    #[error("{kind} `{name}` rejects non-finite value {value}")]
    NonFinite {
        kind: MetricKind,
        name: String,
        value: f64,
    },

    #[error("prometheus: {0}")]
    Prometheus(#[from] prometheus::Error),
}

impl MetricsError {
    /// Whether this error is a caller bug rather than a runtime condition.
    pub const fn is_contract_violation(&self) -> bool {
        matches!(self, Self::LabelShape { .. } | Self::LabelValueCount { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violation_classification() {
        let shape = MetricsError::LabelShape {
            kind: MetricKind::Counter,
            name: "svc:requests".into(),
            expected: vec!["endpoint".into()],
            requested: vec![],
        };
        assert!(shape.is_contract_violation());
        assert!(!MetricsError::EmptyName.is_contract_violation());
    }

    #[test]
    fn test_display_names_kind() {
        let err = MetricsError::LabelShape {
            kind: MetricKind::Histogram,
            name: "svc:operations".into(),
            expected: vec!["name".into()],
            requested: vec!["name".into(), "extra".into()],
        };
        assert!(err.to_string().starts_with("histogram `svc:operations`"));
    }

    #[test]
    fn test_non_finite_is_runtime_condition() {
        let err = MetricsError::NonFinite {
            kind: MetricKind::Counter,
            name: "svc:c".into(),
            value: f64::NAN,
        };
        assert!(!err.is_contract_violation());
        assert_eq!(err.to_string(), "counter `svc:c` rejects non-finite value NaN");
    }
}
