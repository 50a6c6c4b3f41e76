//! Declarative OIDC gateway.
//!
//! Endpoints are declared in a configuration file (path, method, handler
//! name, identity provider); each becomes a route whose handler runs only
//! after the request's bearer token has been verified against the declared
//! provider.
//!
//! # Architecture Overview
//!
//! ```text
//!   config file ──▶ config (schema / loader / validation)
//!                      │ endpoint specs
//!                      ▼
//!                  gateway ──registration──▶ handlers (registry + guard)
//!                      │                           │
//!                      │ per request               │ verify
//!                      ▼                           ▼
//!                  axum router ──────────▶ auth (discovery / verifier / cache)
//! ```

pub mod auth;
pub mod config;
pub mod gateway;
pub mod handlers;

pub use config::loader::load_config;
pub use config::schema::GatewayConfig;
pub use gateway::{Gateway, GatewayError};
