//! Maintenance response rendering.
//!
//! Exactly one content source is configured per warden: a cached file, an
//! inline string, or a remote maintenance service. Every branch answers with
//! the configured status code, including its failure paths.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, request, HeaderValue, Response, StatusCode};

use crate::config::{ConfigError, ContentSource, MaintenanceConfig};
use crate::http::headers::NO_CACHE;
use crate::maintenance::file_cache::{FileCache, FileCacheError, LoadOutcome};
use crate::maintenance::forwarder::StatusOverrideForwarder;
use crate::observability::{metrics, LogLevel};

/// Body sent when no maintenance content can be produced.
pub const UNAVAILABLE_BODY: &str = "Service temporarily unavailable";

/// Resolved content source, ready to serve.
#[derive(Debug)]
pub enum Content {
    File(Arc<FileCache>),
    Inline(Bytes),
    Remote(StatusOverrideForwarder),
}

/// Renders maintenance responses for one warden.
#[derive(Debug)]
pub struct ContentResponder {
    content: Content,
    status: StatusCode,
    content_type: HeaderValue,
    log_level: LogLevel,
}

impl ContentResponder {
    /// Prepare the configured source. A file source is loaded here, so a
    /// missing, unreadable or empty file fails construction.
    pub fn new(config: &MaintenanceConfig) -> Result<Self, ConfigError> {
        let content = match &config.source {
            ContentSource::File(path) => {
                let cache = FileCache::open(path)?;
                warden_log!(config.log_level, Info,
                    path = %path.display(),
                    bytes = cache.snapshot().map_or(0, |c| c.len()),
                    "Loaded maintenance file"
                );
                Content::File(Arc::new(cache))
            }
            ContentSource::Inline(body) => {
                warden_log!(config.log_level, Info,
                    bytes = body.len(),
                    "Using provided maintenance content"
                );
                Content::Inline(body.clone())
            }
            ContentSource::Remote { url, timeout } => {
                warden_log!(config.log_level, Info,
                    service = %url,
                    timeout = ?timeout,
                    "Proxying maintenance requests to service"
                );
                Content::Remote(StatusOverrideForwarder::new(url.clone(), config.status, *timeout))
            }
        };

        Ok(Self {
            content,
            status: config.status,
            content_type: config.content_type.clone(),
            log_level: config.log_level,
        })
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Produce the maintenance response. Never fails: errors degrade to the
    /// generic unavailable body at the configured status.
    pub async fn respond(&self, parts: &request::Parts, body: Body) -> Response<Body> {
        match &self.content {
            Content::File(cache) => self.serve_file(cache).await,
            Content::Inline(content) => self.static_response(content.clone()),
            Content::Remote(forwarder) => match forwarder.forward(parts, body).await {
                Ok(response) => response,
                Err(e) => {
                    metrics::record_upstream_failure(e.kind());
                    warden_log!(self.log_level, Error,
                        service = %forwarder.target(),
                        error = %e,
                        "Error proxying to maintenance service"
                    );
                    unavailable_response(self.status)
                }
            },
        }
    }

    async fn serve_file(&self, cache: &Arc<FileCache>) -> Response<Body> {
        let reload = {
            let cache = Arc::clone(cache);
            tokio::task::spawn_blocking(move || cache.load()).await
        };

        match reload {
            Ok(Ok(LoadOutcome::Unchanged)) => {}
            Ok(Ok(LoadOutcome::Reloaded { bytes })) => {
                metrics::record_file_reload("reloaded");
                warden_log!(self.log_level, Info,
                    path = %cache.path().display(),
                    bytes,
                    "Reloaded maintenance file"
                );
            }
            Ok(Err(e)) => self.reload_failed(&e),
            Err(e) => {
                metrics::record_file_reload("error");
                warden_log!(self.log_level, Error, error = %e, "Maintenance file reload task failed");
            }
        }

        match cache.snapshot() {
            Some(content) => self.static_response(content),
            None => unavailable_response(self.status),
        }
    }

    fn reload_failed(&self, e: &FileCacheError) {
        metrics::record_file_reload("error");
        warden_log!(self.log_level, Error,
            error = %e,
            "Failed to load maintenance file, serving last good content"
        );
    }

    fn static_response(&self, content: Bytes) -> Response<Body> {
        let mut response = Response::new(Body::from(content));
        *response.status_mut() = self.status;
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, self.content_type.clone());
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
        response
    }
}

/// Generic maintenance response used when the configured source fails.
pub fn unavailable_response(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::from(UNAVAILABLE_BODY));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
