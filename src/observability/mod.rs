//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Warden and HTTP host produce:
//!     → logging.rs (structured log events, gated per instance)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows into every maintenance log event
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

pub use logging::LogLevel;
