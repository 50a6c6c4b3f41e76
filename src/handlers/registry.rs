//! Symbolic handler resolution.
//!
//! # Design Decisions
//! - The known handler names form a closed enumeration fixed at build time;
//!   adding a handler means adding a variant here and its implementation in
//!   `builtin.rs`
//! - Resolution happens once, at registration, never per request
//! - An unknown name fails registration before the gateway starts serving

use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use thiserror::Error;

use crate::auth::cache::VerifierCache;
use crate::auth::verifier::Claims;
use crate::config::schema::OidcConfig;
use crate::handlers::builtin::{Greet, Whoami};
use crate::handlers::guard::AuthenticatedEndpoint;

/// Application logic run once a request is authenticated. Stateless and
/// immutable after registration.
#[async_trait]
pub trait AppHandler: Send + Sync {
    async fn handle(&self, claims: Claims) -> Response;
}

/// The closed set of handler names a configuration may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Greet,
    Whoami,
}

impl HandlerKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "greet" => Some(Self::Greet),
            "whoami" => Some(Self::Whoami),
            _ => None,
        }
    }

    fn instantiate(self) -> Arc<dyn AppHandler> {
        match self {
            Self::Greet => Arc::new(Greet),
            Self::Whoami => Arc::new(Whoami),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown handler '{0}'")]
    UnknownHandler(String),
}

/// Resolve a declared handler name into an endpoint behavior bound to the
/// declaring endpoint's provider configuration.
pub fn resolve(
    name: &str,
    oidc: OidcConfig,
    verifiers: Arc<VerifierCache>,
) -> Result<AuthenticatedEndpoint, RegistryError> {
    let kind =
        HandlerKind::from_name(name).ok_or_else(|| RegistryError::UnknownHandler(name.to_string()))?;

    Ok(AuthenticatedEndpoint::new(kind.instantiate(), oidc, verifiers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::VerifierConfig;

    fn oidc() -> OidcConfig {
        OidcConfig {
            issuer: "https://accounts.example.com".to_string(),
            client_id: "gateway-client".to_string(),
            client_secret: String::new(),
        }
    }

    #[test]
    fn known_names_resolve() {
        assert_eq!(HandlerKind::from_name("greet"), Some(HandlerKind::Greet));
        assert_eq!(HandlerKind::from_name("whoami"), Some(HandlerKind::Whoami));
    }

    #[test]
    fn names_are_exact_matches() {
        assert_eq!(HandlerKind::from_name("Greet"), None);
        assert_eq!(HandlerKind::from_name("greet "), None);
        assert_eq!(HandlerKind::from_name(""), None);
    }

    #[test]
    fn unknown_name_carries_the_name_back() {
        let verifiers = Arc::new(VerifierCache::new(&VerifierConfig::default()).unwrap());
        let err = resolve("handleHello", oidc(), verifiers).unwrap_err();

        let RegistryError::UnknownHandler(name) = err;
        assert_eq!(name, "handleHello");
    }
}
