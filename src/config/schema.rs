//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Token verifier settings shared by every endpoint.
    pub verifier: VerifierConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Declared endpoints, registered in order at startup.
    pub endpoints: Vec<EndpointSpec>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Token verifier settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Provider discovery timeout in seconds.
    pub discovery_timeout_secs: u64,

    /// Clock-skew leeway for token expiry checks in seconds.
    pub leeway_secs: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            discovery_timeout_secs: 10,
            leeway_secs: 60,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// One declared endpoint: a route plus the identity provider guarding it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointSpec {
    /// Route path (e.g., "/hello").
    pub path: String,

    /// HTTP verb to match.
    pub method: String,

    /// Symbolic handler name, resolved at registration.
    pub handler: String,

    /// Identity provider binding for this endpoint.
    pub oidc: OidcConfig,
}

/// Identity provider binding.
///
/// Keyed on all three fields when deduplicating verifiers, so endpoints
/// declaring the same provider share one discovery.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct OidcConfig {
    /// Issuer URL; discovery starts at its well-known metadata document.
    pub issuer: String,

    /// Client identifier, the expected audience of accepted tokens.
    pub client_id: String,

    /// Reserved for token-endpoint flows; not used for verification.
    #[serde(default)]
    pub client_secret: String,
}

impl std::fmt::Debug for OidcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Keep the client secret out of log output.
        f.debug_struct("OidcConfig")
            .field("issuer", &self.issuer)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [[endpoints]]
            path = "/hello"
            method = "GET"
            handler = "greet"

            [endpoints.oidc]
            issuer = "https://accounts.example.com"
            client_id = "gateway-client"
            client_secret = "shhh"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.listener.tls.is_none());
        assert_eq!(config.verifier.discovery_timeout_secs, 10);
        assert_eq!(config.verifier.leeway_secs, 60);
        assert_eq!(config.timeouts.request_secs, 30);

        assert_eq!(config.endpoints.len(), 1);
        let endpoint = &config.endpoints[0];
        assert_eq!(endpoint.path, "/hello");
        assert_eq!(endpoint.method, "GET");
        assert_eq!(endpoint.handler, "greet");
        assert_eq!(endpoint.oidc.issuer, "https://accounts.example.com");
        assert_eq!(endpoint.oidc.client_id, "gateway-client");
    }

    #[test]
    fn client_secret_defaults_to_empty() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [[endpoints]]
            path = "/hello"
            method = "GET"
            handler = "greet"

            [endpoints.oidc]
            issuer = "https://accounts.example.com"
            client_id = "gateway-client"
            "#,
        )
        .unwrap();

        assert_eq!(config.endpoints[0].oidc.client_secret, "");
    }

    #[test]
    fn debug_output_redacts_client_secret() {
        let oidc = OidcConfig {
            issuer: "https://accounts.example.com".to_string(),
            client_id: "gateway-client".to_string(),
            client_secret: "super-secret".to_string(),
        };

        let printed = format!("{:?}", oidc);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
