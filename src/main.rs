//! Maintenance Warden
//!
//! A small reverse proxy that fronts one service and switches it into
//! maintenance mode.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │              MAINTENANCE WARDEN              │
//!                        │                                              │
//!   Client Request       │  ┌─────────┐    ┌────────────┐   bypass      │
//!   ─────────────────────┼─▶│  http   │───▶│   bypass   │──────────────┼──▶ Upstream
//!                        │  │ server  │    │  evaluator │               │    Service
//!                        │  └─────────┘    └─────┬──────┘               │
//!                        │                       │ maintenance          │
//!                        │                       ▼                      │
//!   Client Response      │               ┌──────────────┐               │
//!   ◀────────────────────┼───────────────│  responder   │◀──────────────┼─── Maintenance
//!   (status pinned)      │               │ file/inline/ │               │    Service
//!                        │               │   remote     │               │
//!                        │               └──────────────┘               │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use maintenance_warden::config::{load_config, WardenConfig};
use maintenance_warden::observability::{logging, metrics};
use maintenance_warden::HttpServer;

#[derive(Parser)]
#[command(name = "maintenance-warden")]
#[command(about = "Maintenance mode gateway in front of an HTTP service", long_about = None)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    listen: Option<String>,

    /// Override the upstream service URL.
    #[arg(short, long)]
    upstream: Option<String>,

    /// Force maintenance mode on.
    #[arg(long, conflicts_with = "disabled")]
    enabled: bool,

    /// Force maintenance mode off.
    #[arg(long)]
    disabled: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => WardenConfig::default(),
    };
    if let Some(listen) = cli.listen {
        config.listener.bind_address = listen;
    }
    if let Some(upstream) = cli.upstream {
        config.upstream.address = upstream;
    }
    if cli.enabled {
        config.maintenance.enabled = true;
    }
    if cli.disabled {
        config.maintenance.enabled = false;
    }

    logging::init_tracing(config.maintenance.log_level);

    tracing::info!("maintenance-warden v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
