//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! infrastructure. Each sub-module groups adapters by concern.
//!
//! Adapter categories:
//! - `http`: axum request-tracing middleware
//! - `metrics`: Prometheus vector registry, factory, recorders, exposition
//! - `reporting`: span fan-out and structured span logging

pub mod http;
pub mod metrics;
pub mod reporting;
