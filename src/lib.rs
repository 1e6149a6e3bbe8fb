//! Maintenance mode middleware for HTTP services.
//!
//! Decides per request whether to pass traffic through to the real service
//! or to answer with a maintenance response, served from a cached file,
//! inline content, or a maintenance service whose status code is pinned.

pub mod config;
pub mod http;
pub mod maintenance;
pub mod observability;

pub use config::{ConfigError, MaintenanceConfig, MaintenanceSettings, WardenConfig};
pub use http::HttpServer;
pub use maintenance::{maintenance_middleware, Decision, Warden};
