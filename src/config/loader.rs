//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::WardenConfig;
use crate::config::validation::{parse_service_url, MaintenanceConfig, ValidationError};
use crate::maintenance::file_cache::FileCacheError;

/// Error type for configuration loading and warden construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to load maintenance file: {0}")]
    MaintenanceFile(#[from] FileCacheError),
}

/// Load and validate configuration from a TOML (or `.json`) file.
pub fn load_config(path: &Path) -> Result<WardenConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: WardenConfig = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        _ => toml::from_str(&content)?,
    };

    validate_config(&config)?;

    Ok(config)
}

/// Semantic checks that need no I/O.
pub fn validate_config(config: &WardenConfig) -> Result<(), ValidationError> {
    MaintenanceConfig::resolve(&config.maintenance)?;
    parse_service_url(&config.upstream.address)?;
    Ok(())
}
