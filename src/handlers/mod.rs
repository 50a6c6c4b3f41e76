//! Handler registry subsystem.
//!
//! # Data Flow
//! ```text
//! EndpointSpec (handler name, oidc)
//!     → registry.rs (closed name → HandlerKind → AppHandler)
//!     → guard.rs (AuthenticatedEndpoint: verify, then dispatch)
//!     → registered in the gateway's route table
//!
//! Per request:
//!     headers → guard (verify) → builtin handler (claims → response)
//! ```

pub mod builtin;
pub mod guard;
pub mod registry;

pub use guard::AuthenticatedEndpoint;
pub use registry::{resolve, AppHandler, HandlerKind, RegistryError};
