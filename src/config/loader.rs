//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;
use crate::domain::normalize::is_label_name;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    service = %config.service.name,
    namespace = %config.namespace(),
    default_tags = config.metrics.tags.len(),
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty service name
/// - Parseable bind address
/// - Default tag keys usable as label names, without the reserved `__` prefix
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.service.name.trim().is_empty(),
    "service.name must not be empty"
  );

  config
    .metrics
    .bind_address
    .parse::<SocketAddr>()
    .with_context(|| {
      format!(
        "metrics.bind_address is not a socket address: {}",
        config.metrics.bind_address
      )
    })?;

  for key in config.metrics.tags.keys() {
    anyhow::ensure!(
      is_label_name(key),
      "metrics.tags key {:?} is not a valid label name",
      key
    );
    anyhow::ensure!(
      !key.starts_with("__"),
      "metrics.tags key {:?} uses the reserved `__` prefix",
      key
    );
  }

  Ok(())
}
