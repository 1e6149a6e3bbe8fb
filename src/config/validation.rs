//! Configuration validation.
//!
//! # Responsibilities
//! - Resolve the single content source (file, inline, remote service)
//! - Apply defaults (status code, content type, timeout)
//! - Validate value ranges and header syntax
//!
//! # Design Decisions
//! - Validation is a pure function: `MaintenanceSettings → MaintenanceConfig`
//! - File I/O is left to the warden, which loads the file right after
//! - Runs before the middleware is installed into the request path

use std::path::PathBuf;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::schema::MaintenanceSettings;
use crate::observability::LogLevel;

/// Content type used when none is configured.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Maintenance service timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A semantic configuration error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("either maintenanceService, maintenanceFilePath, or maintenanceContent must be specified")]
    NoContentSource,

    #[error("only one of maintenanceService, maintenanceFilePath, or maintenanceContent may be specified (got {0})")]
    ConflictingContentSources(String),

    #[error("invalid service URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("service URL {0:?} must include scheme and host")]
    IncompleteUrl(String),

    #[error("service URL {0:?} must use the http or https scheme")]
    UnsupportedScheme(String),

    #[error("invalid status code {0}")]
    InvalidStatusCode(u16),

    #[error("invalid bypass header name {0:?}")]
    InvalidBypassHeader(String),

    #[error("invalid content type {0:?}")]
    InvalidContentType(String),
}

/// Where the maintenance response body comes from.
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// A file on disk, cached and reloaded when it changes.
    File(PathBuf),
    /// Literal content from the configuration.
    Inline(Bytes),
    /// A maintenance service the request is forwarded to.
    Remote { url: Url, timeout: Duration },
}

impl ContentSource {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentSource::File(_) => "file",
            ContentSource::Inline(_) => "inline",
            ContentSource::Remote { .. } => "remote",
        }
    }
}

/// Validated, immutable maintenance settings.
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    pub name: String,
    pub source: ContentSource,
    /// `None` when no bypass header is configured.
    pub bypass_header: Option<HeaderName>,
    pub bypass_header_value: String,
    pub bypass_paths: Vec<String>,
    pub bypass_favicon: bool,
    pub enabled: bool,
    pub status: StatusCode,
    pub content_type: HeaderValue,
    pub log_level: LogLevel,
}

impl MaintenanceConfig {
    /// Validate raw settings and apply defaults.
    pub fn resolve(settings: &MaintenanceSettings) -> Result<Self, ValidationError> {
        let source = resolve_source(settings)?;

        let status = match settings.status_code {
            0 => StatusCode::SERVICE_UNAVAILABLE,
            code => StatusCode::from_u16(code)
                .map_err(|_| ValidationError::InvalidStatusCode(code))?,
        };

        let content_type = if settings.content_type.is_empty() {
            HeaderValue::from_static(DEFAULT_CONTENT_TYPE)
        } else {
            HeaderValue::from_str(&settings.content_type)
                .map_err(|_| ValidationError::InvalidContentType(settings.content_type.clone()))?
        };

        let bypass_header = if settings.bypass_header.is_empty() {
            None
        } else {
            let name = HeaderName::from_bytes(settings.bypass_header.as_bytes())
                .map_err(|_| ValidationError::InvalidBypassHeader(settings.bypass_header.clone()))?;
            Some(name)
        };

        Ok(Self {
            name: settings.name.clone(),
            source,
            bypass_header,
            bypass_header_value: settings.bypass_header_value.clone(),
            bypass_paths: settings.bypass_paths.clone(),
            bypass_favicon: settings.bypass_favicon,
            enabled: settings.enabled,
            status,
            content_type,
            log_level: settings.log_level,
        })
    }
}

fn resolve_source(settings: &MaintenanceSettings) -> Result<ContentSource, ValidationError> {
    let configured: Vec<&str> = [
        ("maintenanceFilePath", &settings.maintenance_file_path),
        ("maintenanceContent", &settings.maintenance_content),
        ("maintenanceService", &settings.maintenance_service),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(key, _)| key)
    .collect();

    if configured.len() > 1 {
        return Err(ValidationError::ConflictingContentSources(configured.join(", ")));
    }

    if !settings.maintenance_file_path.is_empty() {
        Ok(ContentSource::File(PathBuf::from(&settings.maintenance_file_path)))
    } else if !settings.maintenance_content.is_empty() {
        Ok(ContentSource::Inline(Bytes::from(settings.maintenance_content.clone())))
    } else if !settings.maintenance_service.is_empty() {
        let url = parse_service_url(&settings.maintenance_service)?;
        let timeout = match settings.maintenance_timeout {
            0 => DEFAULT_TIMEOUT,
            secs => Duration::from_secs(secs),
        };
        Ok(ContentSource::Remote { url, timeout })
    } else {
        Err(ValidationError::NoContentSource)
    }
}

/// Parse a service base URL, requiring an `http` or `https` scheme and a host.
pub fn parse_service_url(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw).map_err(|source| ValidationError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::IncompleteUrl(raw.to_string()));
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme(raw.to_string()));
    }

    Ok(url)
}
