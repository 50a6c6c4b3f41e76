//! Identity provider discovery.
//!
//! Fetches the issuer's well-known metadata document and its JWKS so tokens
//! can be validated locally afterwards.

use jsonwebtoken::jwk::JwkSet;
use serde::Deserialize;
use url::Url;

use crate::auth::error::DiscoveryError;

/// Well-known path for provider metadata, relative to the issuer URL.
pub const WELL_KNOWN_PATH: &str = "/.well-known/openid-configuration";

/// Result of parsing the provider metadata document.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub jwks_uri: String,

    #[serde(default)]
    pub authorization_endpoint: Option<String>,
    #[serde(default)]
    pub token_endpoint: Option<String>,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
}

/// Metadata document URL for an issuer.
pub fn discovery_url(issuer: &str) -> Result<Url, DiscoveryError> {
    let url = format!("{}{}", issuer.trim_end_matches('/'), WELL_KNOWN_PATH);
    Ok(Url::parse(&url)?)
}

/// Fetch and check the provider metadata document.
///
/// The published issuer must match the configured one; a mismatch means the
/// metadata cannot be trusted for this configuration.
pub async fn fetch_metadata(
    client: &reqwest::Client,
    issuer: &str,
) -> Result<ProviderMetadata, DiscoveryError> {
    let url = discovery_url(issuer)?;

    let metadata: ProviderMetadata = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if metadata.issuer.trim_end_matches('/') != issuer.trim_end_matches('/') {
        return Err(DiscoveryError::IssuerMismatch {
            configured: issuer.to_string(),
            discovered: metadata.issuer.clone(),
        });
    }

    Ok(metadata)
}

/// Fetch the provider's signing keys.
pub async fn fetch_jwks(
    client: &reqwest::Client,
    jwks_uri: &str,
) -> Result<JwkSet, DiscoveryError> {
    let jwks: JwkSet = client
        .get(jwks_uri)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(jwks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_url_joins_well_known_path() {
        let url = discovery_url("https://accounts.example.com").unwrap();
        assert_eq!(
            url.as_str(),
            "https://accounts.example.com/.well-known/openid-configuration"
        );
    }

    #[test]
    fn discovery_url_tolerates_trailing_slash() {
        let url = discovery_url("https://accounts.example.com/tenant/").unwrap();
        assert_eq!(
            url.as_str(),
            "https://accounts.example.com/tenant/.well-known/openid-configuration"
        );
    }

    #[test]
    fn discovery_url_rejects_relative_issuer() {
        assert!(discovery_url("accounts.example.com").is_err());
    }
}
