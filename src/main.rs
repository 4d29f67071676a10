//! span-prometheus - Entry Point
//!
//! Runs the span-to-metrics pipeline as a standalone exposition
//! service. Its own probe requests are traced through the same
//! middleware a host application would use.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Build the metric registry and the tag-map metrics factory
//! 4. Build reporters (Prometheus recorder, optional span logger) behind a composite
//! 5. Serve /metrics (untraced) plus traced /live and /ready
//! 6. Wait for SIGINT → readiness 503 → graceful shutdown

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use span_prometheus::adapters::http::traced_router;
use span_prometheus::adapters::metrics::server::{self, health_router};
use span_prometheus::adapters::metrics::{
    HealthState, MetricRegistry, PrometheusMetricsFactory, PrometheusReporter,
};
use span_prometheus::adapters::reporting::{CompositeReporter, LoggingReporter, ReporterStats};
use span_prometheus::config;
use span_prometheus::ports::SpanReporter;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.service.log_level)
                }),
        )
        .json()
        .init();

    let namespace = config.namespace().to_owned();
    info!(
        service = %config.service.name,
        namespace = %namespace,
        version = env!("CARGO_PKG_VERSION"),
        "Starting span-prometheus"
    );

    // ── 3. Registry + factory ───────────────────────────────
    let registry = Arc::new(MetricRegistry::new());
    let factory = PrometheusMetricsFactory::with_tags(
        namespace.clone(),
        Arc::clone(&registry),
        config.metrics.tags.clone(),
    );

    // ── 4. Reporters ────────────────────────────────────────
    let mut reporters: Vec<Arc<dyn SpanReporter>> = vec![Arc::new(
        PrometheusReporter::new(&registry, &namespace)
            .context("Failed to register span metrics")?,
    )];
    if config.reporting.log_spans {
        reporters.push(Arc::new(LoggingReporter));
    }
    let stats = ReporterStats::new(&factory).context("Failed to register reporter metrics")?;
    let reporter: Arc<dyn SpanReporter> =
        Arc::new(CompositeReporter::new(reporters).with_stats(stats));

    // ── 5. Serve ────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let health = HealthState::new();
    let app = traced_router(health_router(health.clone()), reporter, Arc::clone(&registry));

    let bind_address = config.metrics.bind_address.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::serve(app, bind_address, health, shutdown_rx).await {
            error!(error = %e, "Metrics server failed");
        }
    });

    info!("Span metrics pipeline running");

    // ── 6. Wait for SIGINT ──────────────────────────────────
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for SIGINT, shutting down");
    } else {
        info!("SIGINT received, initiating graceful shutdown");
    }

    let _ = shutdown_tx.send(());

    if tokio::time::timeout(Duration::from_secs(10), server_handle)
        .await
        .is_err()
    {
        warn!("Metrics server did not drain within 10s");
    }

    info!("Shutdown complete");
    Ok(())
}
