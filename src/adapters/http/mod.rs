//! HTTP Adapters
//!
//! axum middleware that turns inbound requests into finished server
//! spans for the reporter pipeline.

pub mod middleware;

pub use middleware::{trace_request, traced_router};
