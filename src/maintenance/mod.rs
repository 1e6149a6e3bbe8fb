//! Maintenance mode subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → bypass.rs (disabled? favicon? path prefix? bypass header?)
//!         → match: next handler, request untouched
//!         → no match: responder.rs
//!             → file_cache.rs (lazy reload, last good snapshot)
//!             → inline content
//!             → forwarder.rs (maintenance service, status pinned)
//!     → Retry-After + X-Maintenance-Mode stamped on every maintenance response
//! ```
//!
//! # Design Decisions
//! - The decision is made per request and never persisted
//! - Exactly one of {next handler, maintenance response} runs per request
//! - The only shared mutable state is the file cache
//! - No background tasks: reloads and proxying happen inside the request

/// Emit a tracing event if the warden's configured level allows it.
macro_rules! warden_log {
    ($level:expr, Error, $($arg:tt)+) => {
        if $level.allows($crate::observability::LogLevel::Error) {
            ::tracing::error!($($arg)+);
        }
    };
    ($level:expr, Info, $($arg:tt)+) => {
        if $level.allows($crate::observability::LogLevel::Info) {
            ::tracing::info!($($arg)+);
        }
    };
    ($level:expr, Debug, $($arg:tt)+) => {
        if $level.allows($crate::observability::LogLevel::Debug) {
            ::tracing::debug!($($arg)+);
        }
    };
}

pub mod bypass;
pub mod file_cache;
pub mod forwarder;
pub mod responder;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{request, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use crate::config::{ConfigError, MaintenanceConfig, MaintenanceSettings};
use crate::http::headers::stamp_maintenance;
use crate::http::X_REQUEST_ID;
use crate::observability::metrics;

pub use bypass::{should_bypass, BypassPolicy, BypassReason};
pub use file_cache::{FileCache, FileCacheError, LoadOutcome};
pub use forwarder::{ForwardError, OverrideStatus, StatusOverrideForwarder};
pub use responder::{unavailable_response, Content, ContentResponder, UNAVAILABLE_BODY};

/// Per-request outcome of the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    /// Hand the request to the next handler unchanged.
    PassThrough(BypassReason<'a>),
    /// Answer with the maintenance response.
    Maintenance,
}

/// Maintenance mode middleware state.
///
/// Built once from validated configuration and shared via `Arc` with every
/// request. Construction fails if the content source cannot be prepared.
#[derive(Debug)]
pub struct Warden {
    config: MaintenanceConfig,
    policy: BypassPolicy,
    responder: ContentResponder,
}

impl Warden {
    pub fn new(config: MaintenanceConfig) -> Result<Self, ConfigError> {
        let policy = BypassPolicy::from_config(&config);
        let responder = ContentResponder::new(&config)?;
        Ok(Self {
            config,
            policy,
            responder,
        })
    }

    /// Validate raw settings and build the warden.
    pub fn from_settings(settings: &MaintenanceSettings) -> Result<Self, ConfigError> {
        Self::new(MaintenanceConfig::resolve(settings)?)
    }

    pub fn config(&self) -> &MaintenanceConfig {
        &self.config
    }

    /// The file cache, when the content source is a file.
    pub fn file_cache(&self) -> Option<&FileCache> {
        match self.responder.content() {
            Content::File(cache) => Some(&**cache),
            _ => None,
        }
    }

    /// Choose between pass-through and maintenance for `req`.
    pub fn decide<B>(&self, req: &Request<B>) -> Decision<'_> {
        match self.policy.evaluate(req) {
            Some(reason) => Decision::PassThrough(reason),
            None => Decision::Maintenance,
        }
    }

    /// Build the maintenance response for a request that was not bypassed.
    pub async fn serve_maintenance(&self, parts: &request::Parts, body: Body) -> Response {
        let mut response = self.responder.respond(parts, body).await;
        stamp_maintenance(response.headers_mut());
        response
    }
}

/// Axum middleware running the warden in front of `next`.
pub async fn maintenance_middleware(
    State(warden): State<Arc<Warden>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let level = warden.config.log_level;
    let decision = warden.decide(&request);

    match decision {
        Decision::PassThrough(reason) => {
            metrics::record_request(reason.as_str());
            match reason {
                BypassReason::Disabled => warden_log!(level, Debug,
                    uri = %request.uri(),
                    "Maintenance mode is disabled, passing request through"
                ),
                BypassReason::Favicon => warden_log!(level, Debug,
                    uri = %request.uri(),
                    "Request is for favicon.ico, bypassing maintenance mode"
                ),
                BypassReason::PathPrefix(prefix) => warden_log!(level, Debug,
                    path = %request.uri().path(),
                    prefix,
                    "Request path matches bypass path, passing through"
                ),
                BypassReason::Header => warden_log!(level, Debug,
                    header = ?warden.config.bypass_header,
                    "Bypass header found, passing to next handler"
                ),
            }
            next.run(request).await
        }
        Decision::Maintenance => {
            metrics::record_request("maintenance");
            let request_id = request
                .headers()
                .get(&X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string();
            let span = tracing::info_span!(
                "maintenance",
                warden = %warden.config.name,
                source = warden.config.source.kind(),
                request_id = %request_id,
            );

            warden_log!(level, Info,
                parent: &span,
                uri = %request.uri(),
                "No bypass condition met, serving maintenance page"
            );

            let (parts, body) = request.into_parts();
            warden
                .serve_maintenance(&parts, body)
                .instrument(span)
                .await
        }
    }
}
