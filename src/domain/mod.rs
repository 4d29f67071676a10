//! Domain layer - spans, tags and naming rules.
//!
//! Pure logic with no metrics-backend dependency: the finished span
//! model, span classification, name normalization and tag merging.

pub mod classify;
pub mod normalize;
pub mod span;
pub mod tags;

pub use classify::{HttpOutcome, SpanShape};
pub use span::{Span, Tag, TagValue};
pub use tags::{LabelSet, TagSet, Tags};
