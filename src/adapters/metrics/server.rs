//! Metrics Exposition Server - /metrics, /live, /ready
//!
//! Serves the registry in Prometheus text format alongside liveness and
//! readiness probes via axum 0.7. Readiness flips to 503 as soon as
//! shutdown begins so orchestrators stop routing traffic first.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::sync::broadcast;
use tracing::{error, info, instrument};

use crate::adapters::metrics::registry::MetricRegistry;

/// Prometheus text exposition content type.
pub const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Shared readiness flag polled by `/ready`.
#[derive(Debug, Clone)]
pub struct HealthState {
    ready: Arc<AtomicBool>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Ready by default.
    pub fn new() -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    /// Mark as draining; `/ready` answers 503 from now on.
    pub fn set_draining(&self) {
        self.ready.store(false, Ordering::Relaxed);
    }
}

/// Render the registry for scraping.
pub async fn render_metrics(State(registry): State<Arc<MetricRegistry>>) -> Response {
    match registry.render() {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Router exposing only `/metrics`.
pub fn metrics_router(registry: Arc<MetricRegistry>) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(registry)
}

/// Router exposing `/live` and `/ready`.
pub fn health_router(health: HealthState) -> Router {
    Router::new()
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(health)
}

/// Liveness probe: always 200 while the process runs.
async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe: 503 once draining.
async fn readiness(State(health): State<HealthState>) -> impl IntoResponse {
    if health.is_ready() {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

/// Serve `app` on `bind_address` until the shutdown signal fires.
#[instrument(skip(app, health, shutdown_rx))]
pub async fn serve(
    app: Router,
    bind_address: String,
    health: HealthState,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Metrics server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            health.set_draining();
            info!("Metrics server draining");
        })
        .await?;

    Ok(())
}
