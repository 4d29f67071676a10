//! Logging Reporter - finished spans as structured log events.

use tracing::debug;

use crate::domain::span::Span;
use crate::error::Result;
use crate::ports::reporter::SpanReporter;

/// Writes every span at `debug` level with its tags as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReporter;

impl SpanReporter for LoggingReporter {
    fn report_span(&self, span: &Span) -> Result<()> {
        let tags = serde_json::to_string(&span.tags).unwrap_or_default();
        debug!(
            operation = %span.operation_name,
            duration_s = span.duration_seconds(),
            start = %span.start_time,
            tags = %tags,
            "Span finished"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "logging"
    }
}
