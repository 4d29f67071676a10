//! span-prometheus - Library Root
//!
//! Turns finished tracing spans into labeled Prometheus metrics.
//! Re-exports all modules for integration tests and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

pub use error::{MetricKind, MetricsError, Result};
