//! Gateway subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayConfig.endpoints
//!     → server.rs (register: resolve handler, bind guarded behavior)
//!     → route table (write-once, then read-only)
//!     → axum Router + middleware (request id, trace, timeout)
//!     → serve (plain TCP or TLS) until shutdown
//! ```

pub mod request_id;
pub mod server;

pub use server::{Gateway, GatewayError};
