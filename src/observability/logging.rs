//! Structured logging.
//!
//! # Responsibilities
//! - Define the per-instance log verbosity (`LogLevel`)
//! - Initialize the process subscriber for the binary
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - The verbosity is plain configuration held by each `Warden`; the core
//!   gates its own events and never touches the global subscriber
//! - `RUST_LOG` overrides the configured level for the binary

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log verbosity, configured as an integer from 0 to 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize, Serialize)]
#[serde(from = "u8", into = "u8")]
pub enum LogLevel {
    /// Logging disabled.
    None,
    /// Errors only.
    #[default]
    Error,
    /// Info and errors.
    Info,
    /// Everything.
    Debug,
}

impl LogLevel {
    /// Returns true if an event at `level` should be emitted.
    pub fn allows(self, level: LogLevel) -> bool {
        level != LogLevel::None && level <= self
    }

    /// Directive for the `tracing_subscriber` filter.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::None => "off",
            LogLevel::Error => "error",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl From<u8> for LogLevel {
    fn from(value: u8) -> Self {
        match value {
            0 => LogLevel::None,
            1 => LogLevel::Error,
            2 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self {
        level as u8
    }
}

/// Install the global tracing subscriber.
///
/// Only the binary calls this; library users bring their own subscriber.
pub fn init_tracing(level: LogLevel) {
    let default_filter = format!(
        "maintenance_warden={},tower_http={}",
        level.as_directive(),
        level.as_directive()
    );

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
