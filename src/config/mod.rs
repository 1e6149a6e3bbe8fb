//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML/JSON)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, defaults)
//!     → MaintenanceConfig (validated, immutable)
//!     → owned by the Warden, shared via Arc with every request
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ListenerConfig, MaintenanceSettings, ObservabilityConfig, UpstreamConfig, WardenConfig};
pub use validation::{ContentSource, MaintenanceConfig, ValidationError};
