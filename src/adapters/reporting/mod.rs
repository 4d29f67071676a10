//! Span Reporting Adapters
//!
//! Reporter implementations that are not tied to a metrics backend:
//! the fan-out composite and the structured-log reporter.

pub mod composite;
pub mod logging;

pub use composite::{CompositeReporter, ReporterStats};
pub use logging::LoggingReporter;
