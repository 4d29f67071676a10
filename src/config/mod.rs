//! Configuration Module - TOML-based Service Configuration
//!
//! Loads and validates configuration from `config.toml`. The metrics
//! namespace and the default tag set are externalized here; the core
//! only ever receives them as plain values.

pub mod loader;

use serde::Deserialize;

use crate::domain::tags::Tags;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Service identity.
  pub service: ServiceConfig,
  /// Metric naming and exposition.
  #[serde(default)]
  pub metrics: MetricsConfig,
  /// Span consumers.
  #[serde(default)]
  pub reporting: ReportingConfig,
}

impl AppConfig {
  /// Namespace for every metric name: explicit, or the service name.
  pub fn namespace(&self) -> &str {
    self
      .metrics
      .namespace
      .as_deref()
      .unwrap_or(&self.service.name)
  }
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Service name; also the default metrics namespace.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Namespace override.
  pub namespace: Option<String>,
  /// Exposition server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Default tags merged into every factory-created metric.
  #[serde(default)]
  pub tags: Tags,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      namespace: None,
      bind_address: default_metrics_addr(),
      tags: Tags::new(),
    }
  }
}

/// Span reporting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
  /// Also log every finished span.
  #[serde(default = "default_true")]
  pub log_spans: bool,
}

impl Default for ReportingConfig {
  fn default() -> Self {
    Self {
      log_spans: default_true(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}
