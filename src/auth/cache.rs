//! Shared verifier construction, memoized per provider configuration.
//!
//! Discovery is a network round trip, so it runs at most once per distinct
//! [`OidcConfig`]: concurrent first requests share a single in-flight
//! attempt, and the resulting verifier is reused for the life of the
//! process. A failed attempt leaves nothing behind, so the next request
//! triggers a fresh discovery.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::auth::discovery;
use crate::auth::error::{AuthError, DiscoveryError};
use crate::auth::verifier::TokenVerifier;
use crate::config::schema::{OidcConfig, VerifierConfig};

pub struct VerifierCache {
    http: reqwest::Client,
    discovery_timeout: Duration,
    leeway_secs: u64,
    entries: DashMap<OidcConfig, Arc<OnceCell<Arc<TokenVerifier>>>>,
}

impl VerifierCache {
    pub fn new(config: &VerifierConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.discovery_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            discovery_timeout: Duration::from_secs(config.discovery_timeout_secs),
            leeway_secs: config.leeway_secs,
            entries: DashMap::new(),
        })
    }

    /// Ready verifier for a provider configuration, discovering it first if
    /// this is the configuration's first use.
    pub async fn ready(&self, oidc: &OidcConfig) -> Result<Arc<TokenVerifier>, AuthError> {
        let cell = self.entries.entry(oidc.clone()).or_default().clone();

        // Metadata and JWKS fetches are each bounded by the client timeout;
        // this deadline bounds the discovery step as a whole.
        let deadline = self.discovery_timeout.saturating_mul(2);

        let initialized = tokio::time::timeout(
            deadline,
            cell.get_or_try_init(|| async {
                let verifier = self.discover(oidc).await?;
                Ok(Arc::new(verifier))
            }),
        )
        .await;

        match initialized {
            Ok(Ok(verifier)) => Ok(Arc::clone(verifier)),
            Ok(Err(err)) => {
                tracing::warn!(issuer = %oidc.issuer, error = %err, "provider discovery failed");
                Err(AuthError::ProviderUnavailable(err))
            }
            Err(_) => {
                tracing::warn!(issuer = %oidc.issuer, "provider discovery timed out");
                Err(AuthError::ProviderUnavailable(DiscoveryError::Timeout))
            }
        }
    }

    async fn discover(&self, oidc: &OidcConfig) -> Result<TokenVerifier, DiscoveryError> {
        tracing::info!(issuer = %oidc.issuer, "discovering identity provider");

        let metadata = discovery::fetch_metadata(&self.http, &oidc.issuer).await?;
        let jwks = discovery::fetch_jwks(&self.http, &metadata.jwks_uri).await?;
        let verifier = TokenVerifier::from_jwks(oidc, jwks, self.leeway_secs)?;

        tracing::info!(
            issuer = %oidc.issuer,
            keys = verifier.key_count(),
            "identity provider ready"
        );

        Ok(verifier)
    }
}

impl std::fmt::Debug for VerifierCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifierCache")
            .field("entries", &self.entries.len())
            .field("discovery_timeout", &self.discovery_timeout)
            .finish()
    }
}
