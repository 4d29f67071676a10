//! Span Reporter Port - Finished Span Consumer Interface
//!
//! A tracer calls `report_span` exactly once per finished span.
//! Reporters are composable: several can be attached to the same span
//! stream, and none of them owns the span.

use crate::domain::span::Span;
use crate::error::Result;

/// Consumer of finished spans.
///
/// Implementations must be cheap and synchronous; the caller is the
/// span's own completion path.
pub trait SpanReporter: Send + Sync + 'static {
    /// Consume one finished span.
    fn report_span(&self, span: &Span) -> Result<()>;

    /// Short reporter name for logs.
    fn name(&self) -> &'static str;
}

/// Reporter that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl SpanReporter for NullReporter {
    fn report_span(&self, _span: &Span) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
