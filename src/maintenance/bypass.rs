//! Bypass evaluation.
//!
//! # Responsibilities
//! - Decide whether a request skips maintenance mode
//! - Report which rule fired, for logging
//!
//! # Design Decisions
//! - Rules are checked in a fixed order: disabled, favicon, path prefixes
//!   (in configured order), bypass header
//! - Path matching is case-sensitive, exact prefix, no globbing, against the
//!   percent-decoded path
//! - Header value comparison is exact and case-sensitive; a missing header
//!   reads as the empty string

use axum::http::{HeaderName, Request};
use percent_encoding::percent_decode_str;

use crate::config::MaintenanceConfig;

const FAVICON_SUFFIX: &str = "/favicon.ico";

/// The rule that let a request through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassReason<'a> {
    /// Maintenance mode is switched off.
    Disabled,
    /// The path ends with `/favicon.ico`.
    Favicon,
    /// The path starts with this configured prefix.
    PathPrefix(&'a str),
    /// The bypass header carried the expected value.
    Header,
}

impl BypassReason<'_> {
    /// Short label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            BypassReason::Disabled => "disabled",
            BypassReason::Favicon => "favicon",
            BypassReason::PathPrefix(_) => "path_prefix",
            BypassReason::Header => "header",
        }
    }
}

/// The bypass rules of one warden.
#[derive(Debug, Clone)]
pub struct BypassPolicy {
    enabled: bool,
    favicon: bool,
    path_prefixes: Vec<String>,
    header: Option<HeaderName>,
    header_value: String,
}

impl BypassPolicy {
    pub fn from_config(config: &MaintenanceConfig) -> Self {
        Self {
            enabled: config.enabled,
            favicon: config.bypass_favicon,
            path_prefixes: config.bypass_paths.clone(),
            header: config.bypass_header.clone(),
            header_value: config.bypass_header_value.clone(),
        }
    }

    /// Returns the first rule that matches, or `None` if the request
    /// must be served the maintenance response.
    pub fn evaluate<B>(&self, req: &Request<B>) -> Option<BypassReason<'_>> {
        if !self.enabled {
            return Some(BypassReason::Disabled);
        }

        let path = percent_decode_str(req.uri().path()).decode_utf8_lossy();

        if self.favicon && path.ends_with(FAVICON_SUFFIX) {
            return Some(BypassReason::Favicon);
        }

        if let Some(prefix) = self
            .path_prefixes
            .iter()
            .find(|prefix| path.starts_with(prefix.as_str()))
        {
            return Some(BypassReason::PathPrefix(prefix.as_str()));
        }

        let received = self
            .header
            .as_ref()
            .and_then(|name| req.headers().get(name))
            .map(|value| value.as_bytes())
            .unwrap_or_default();
        if received == self.header_value.as_bytes() {
            return Some(BypassReason::Header);
        }

        None
    }
}

/// Returns true if `req` skips maintenance mode under `config`.
pub fn should_bypass<B>(config: &MaintenanceConfig, req: &Request<B>) -> bool {
    BypassPolicy::from_config(config).evaluate(req).is_some()
}
