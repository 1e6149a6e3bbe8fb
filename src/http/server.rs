//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the warden from configuration (fails fast on bad config)
//! - Create the Axum Router: maintenance middleware in front of the
//!   upstream pass-through
//! - Wire up middleware (tracing, request timeout, request ID); the
//!   maintenance middleware sits outside the request timeout
//! - Serve on a listener until the shutdown future resolves

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{validation::parse_service_url, ConfigError, WardenConfig};
use crate::http::request::{MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::upstream::{proxy_handler, Upstream};
use crate::maintenance::{maintenance_middleware, Warden};

/// HTTP server fronting one upstream with the maintenance warden.
pub struct HttpServer {
    router: Router,
    config: WardenConfig,
    warden: Arc<Warden>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if the maintenance settings or the upstream address are
    /// invalid, or if the maintenance file cannot be loaded.
    pub fn new(config: WardenConfig) -> Result<Self, ConfigError> {
        let warden = Arc::new(Warden::from_settings(&config.maintenance)?);
        let upstream = Arc::new(Upstream::new(parse_service_url(&config.upstream.address)?));

        tracing::info!(
            warden = %warden.config().name,
            enabled = warden.config().enabled,
            source = warden.config().source.kind(),
            status = %warden.config().status,
            upstream = %upstream.target(),
            "Maintenance warden configured"
        );

        let router = Self::build_router(&config, warden.clone(), upstream);
        Ok(Self {
            router,
            config,
            warden,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &WardenConfig, warden: Arc<Warden>, upstream: Arc<Upstream>) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(upstream)
            // the request timeout bounds pass-through only; maintenance
            // responses carry their own deadline
            .layer(TimeoutLayer::new(Duration::from_secs(config.listener.request_timeout_secs)))
            .layer(middleware::from_fn_with_state(warden, maintenance_middleware))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    pub fn warden(&self) -> &Arc<Warden> {
        &self.warden
    }
}
