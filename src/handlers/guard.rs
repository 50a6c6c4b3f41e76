//! Authentication guard wrapped around every registered handler.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};

use crate::auth::cache::VerifierCache;
use crate::auth::error::AuthError;
use crate::auth::verifier::{bearer_token, Claims};
use crate::config::schema::OidcConfig;
use crate::handlers::registry::AppHandler;

/// A registered route behavior: token verification in front of application
/// logic, closed over a single provider configuration.
pub struct AuthenticatedEndpoint {
    inner: Arc<dyn AppHandler>,
    oidc: OidcConfig,
    verifiers: Arc<VerifierCache>,
}

impl AuthenticatedEndpoint {
    pub(crate) fn new(
        inner: Arc<dyn AppHandler>,
        oidc: OidcConfig,
        verifiers: Arc<VerifierCache>,
    ) -> Self {
        Self {
            inner,
            oidc,
            verifiers,
        }
    }

    /// Handle one request: authenticate, then run the application logic.
    /// Authentication failures never reach the inner handler.
    pub async fn call(&self, headers: &HeaderMap) -> Response {
        match self.authenticate(headers).await {
            Ok(claims) => self.inner.handle(claims).await,
            Err(err) => {
                tracing::warn!(issuer = %self.oidc.issuer, error = %err, "request rejected");
                err.into_response()
            }
        }
    }

    async fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let raw = match headers.get(header::AUTHORIZATION) {
            None => None,
            Some(value) => Some(value.to_str().map_err(|_| AuthError::MalformedCredentials)?),
        };

        // Header framing is checked before any provider traffic, so a
        // credential-less request is rejected even while the provider is
        // unreachable.
        let token = bearer_token(raw)?;

        let verifier = self.verifiers.ready(&self.oidc).await?;
        verifier.verify_token(token)
    }
}

impl std::fmt::Debug for AuthenticatedEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedEndpoint")
            .field("oidc", &self.oidc)
            .finish()
    }
}
