//! Token verification subsystem.
//!
//! # Data Flow
//! ```text
//! OidcConfig (issuer, client_id)
//!     → discovery.rs (well-known metadata + JWKS fetch)
//!     → verifier.rs (decoded keys, expected issuer/audience)
//!     → cache.rs (one READY verifier per distinct OidcConfig)
//!
//! Per request:
//!     Authorization header value
//!     → verifier.rs (scheme check → signature/issuer/audience/expiry)
//!     → Claims or AuthError
//! ```
//!
//! # Design Decisions
//! - Discovery runs at most once per distinct provider configuration;
//!   concurrent first uses share one in-flight attempt
//! - A failed discovery is retried on the next request, never cached
//! - A ready verifier validates tokens without further network calls

pub mod cache;
pub mod discovery;
pub mod error;
pub mod verifier;

pub use cache::VerifierCache;
pub use error::{AuthError, DiscoveryError};
pub use verifier::{Claims, TokenVerifier};
