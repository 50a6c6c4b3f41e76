//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic layer: bind address shape,
//! endpoint paths and verbs, issuer URLs. Returns every error found, not
//! just the first, so a misdeclared file is fixable in one pass. Handler
//! names are deliberately not checked here; the registry is the single
//! source of truth for the known set and rejects unknown names at
//! registration, still before the gateway serves.

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// HTTP verbs the gateway can route on.
const SUPPORTED_METHODS: [&str; 8] = [
    "GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "TRACE",
];

/// A single semantic problem in a configuration file.
#[derive(Debug)]
pub enum ValidationError {
    BindAddress { value: String },
    EndpointPath { index: usize, value: String },
    EndpointMethod { index: usize, value: String },
    Issuer { index: usize, value: String },
    ClientId { index: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::BindAddress { value } => {
                write!(f, "listener.bind_address '{}' is not a socket address", value)
            }
            ValidationError::EndpointPath { index, value } => {
                write!(f, "endpoints[{}].path '{}' must start with '/'", index, value)
            }
            ValidationError::EndpointMethod { index, value } => {
                write!(f, "endpoints[{}].method '{}' is not a supported HTTP verb", index, value)
            }
            ValidationError::Issuer { index, value } => {
                write!(
                    f,
                    "endpoints[{}].oidc.issuer '{}' is not an absolute http(s) URL",
                    index, value
                )
            }
            ValidationError::ClientId { index } => {
                write!(f, "endpoints[{}].oidc.client_id must not be empty", index)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a parsed configuration, collecting all errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress {
            value: config.listener.bind_address.clone(),
        });
    }

    for (index, endpoint) in config.endpoints.iter().enumerate() {
        if !endpoint.path.starts_with('/') {
            errors.push(ValidationError::EndpointPath {
                index,
                value: endpoint.path.clone(),
            });
        }

        let method = endpoint.method.to_ascii_uppercase();
        if !SUPPORTED_METHODS.contains(&method.as_str()) {
            errors.push(ValidationError::EndpointMethod {
                index,
                value: endpoint.method.clone(),
            });
        }

        match Url::parse(&endpoint.oidc.issuer) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            _ => errors.push(ValidationError::Issuer {
                index,
                value: endpoint.oidc.issuer.clone(),
            }),
        }

        if endpoint.oidc.client_id.trim().is_empty() {
            errors.push(ValidationError::ClientId { index });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{EndpointSpec, OidcConfig};

    fn endpoint(path: &str, method: &str, issuer: &str, client_id: &str) -> EndpointSpec {
        EndpointSpec {
            path: path.to_string(),
            method: method.to_string(),
            handler: "greet".to_string(),
            oidc: OidcConfig {
                issuer: issuer.to_string(),
                client_id: client_id.to_string(),
                client_secret: String::new(),
            },
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn well_formed_endpoint_is_valid() {
        let mut config = GatewayConfig::default();
        config
            .endpoints
            .push(endpoint("/hello", "get", "https://accounts.example.com", "gw"));

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn bad_bind_address_is_reported() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::BindAddress { .. }));
    }

    #[test]
    fn all_endpoint_errors_are_collected() {
        let mut config = GatewayConfig::default();
        config.endpoints.push(endpoint("hello", "YANK", "ftp://x", ""));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::EndpointPath { index: 0, .. }));
        assert!(matches!(errors[1], ValidationError::EndpointMethod { index: 0, .. }));
        assert!(matches!(errors[2], ValidationError::Issuer { index: 0, .. }));
        assert!(matches!(errors[3], ValidationError::ClientId { index: 0 }));
    }

    #[test]
    fn non_http_issuer_is_rejected() {
        let mut config = GatewayConfig::default();
        config
            .endpoints
            .push(endpoint("/hello", "GET", "accounts.example.com", "gw"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::Issuer { index: 0, .. }));
    }
}
