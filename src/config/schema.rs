//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the warden.
//! All types derive Serde traits for deserialization from config files.
//! The `maintenance` table keeps the camelCase option names the middleware
//! has always been configured with.

use serde::{Deserialize, Serialize};

use crate::observability::logging::LogLevel;

/// Root configuration for the maintenance warden.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WardenConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// The real service requests are passed through to.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Maintenance mode settings.
    pub maintenance: MaintenanceSettings,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Upstream (the real service) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the service, e.g. "http://127.0.0.1:3000".
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:3000".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Raw maintenance settings, as written by the operator.
///
/// Exactly one of `maintenance_service`, `maintenance_file_path` and
/// `maintenance_content` must be set. Use
/// [`MaintenanceConfig::resolve`](crate::config::MaintenanceConfig::resolve)
/// to turn these into a validated snapshot.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaintenanceSettings {
    /// Instance name, attached to every log event.
    pub name: String,

    /// URL of a maintenance service to proxy to.
    pub maintenance_service: String,

    /// Path to a static HTML file to serve.
    pub maintenance_file_path: String,

    /// Literal content to serve.
    pub maintenance_content: String,

    /// Header name that allows bypassing maintenance mode.
    pub bypass_header: String,

    /// Expected value of the bypass header.
    pub bypass_header_value: String,

    /// Whether maintenance mode is active.
    pub enabled: bool,

    /// Status code returned in maintenance mode (0 means 503).
    pub status_code: u16,

    /// Path prefixes that bypass maintenance mode.
    pub bypass_paths: Vec<String>,

    /// Whether `/favicon.ico` requests bypass maintenance mode.
    pub bypass_favicon: bool,

    /// Log verbosity: 0=none, 1=error, 2=info, 3=debug.
    pub log_level: LogLevel,

    /// Timeout for maintenance service requests, in seconds (0 means 10).
    pub maintenance_timeout: u64,

    /// Content type for file and inline content.
    pub content_type: String,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            name: "maintenance-warden".to_string(),
            maintenance_service: String::new(),
            maintenance_file_path: String::new(),
            maintenance_content: String::new(),
            bypass_header: "X-Maintenance-Bypass".to_string(),
            bypass_header_value: "true".to_string(),
            enabled: true,
            status_code: 503,
            bypass_paths: Vec::new(),
            bypass_favicon: true,
            log_level: LogLevel::Error,
            maintenance_timeout: 10,
            content_type: "text/html; charset=utf-8".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = MaintenanceSettings::default();
        assert_eq!(settings.bypass_header, "X-Maintenance-Bypass");
        assert_eq!(settings.bypass_header_value, "true");
        assert!(settings.enabled);
        assert_eq!(settings.status_code, 503);
        assert!(settings.bypass_paths.is_empty());
        assert!(settings.bypass_favicon);
        assert_eq!(settings.log_level, LogLevel::Error);
        assert_eq!(settings.maintenance_timeout, 10);
        assert_eq!(settings.content_type, "text/html; charset=utf-8");
    }

    #[test]
    fn test_camel_case_keys() {
        let config: WardenConfig = toml::from_str(
            r#"
            [upstream]
            address = "http://127.0.0.1:4000"

            [maintenance]
            maintenanceContent = "<html>down</html>"
            bypassPaths = ["/health", "/api/status"]
            bypassFavicon = false
            statusCode = 429
            logLevel = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.address, "http://127.0.0.1:4000");
        assert_eq!(config.maintenance.maintenance_content, "<html>down</html>");
        assert_eq!(config.maintenance.bypass_paths, vec!["/health", "/api/status"]);
        assert!(!config.maintenance.bypass_favicon);
        assert_eq!(config.maintenance.status_code, 429);
        assert_eq!(config.maintenance.log_level, LogLevel::Debug);
        // untouched keys keep their defaults
        assert_eq!(config.maintenance.bypass_header, "X-Maintenance-Bypass");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
