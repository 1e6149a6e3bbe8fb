//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → [maintenance middleware decides]
//!     → upstream.rs (pass-through to the real service)
//!     → Send to client
//! ```
//!
//! `client.rs` and `headers.rs` are shared with the maintenance forwarder.

pub mod client;
pub mod headers;
pub mod request;
pub mod server;
pub mod upstream;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::HttpServer;
