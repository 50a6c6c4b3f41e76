//! Authentication error taxonomy and response mapping.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failure while establishing trust in an identity provider.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid issuer url: {0}")]
    InvalidIssuer(#[from] url::ParseError),

    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("issuer mismatch: configured '{configured}', discovered '{discovered}'")]
    IssuerMismatch {
        configured: String,
        discovered: String,
    },

    #[error("provider published no usable signing keys")]
    NoUsableKeys,

    #[error("discovery timed out")]
    Timeout,
}

/// Failure while authenticating a single request.
///
/// The `Display` output (which carries the underlying cause) is for logs
/// only; responses use the stable message from [`AuthError::public_message`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingCredentials,

    #[error("malformed authorization header")]
    MalformedCredentials,

    #[error("token rejected: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(#[source] DiscoveryError),
}

impl AuthError {
    /// Response status: client credential problems are 401, a provider
    /// outage is the gateway's problem and maps to 500.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::MalformedCredentials
            | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::ProviderUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable message for the response body; never includes provider or
    /// library error text.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "authorization required",
            AuthError::MalformedCredentials => "invalid authorization header",
            AuthError::InvalidToken(_) => "invalid token",
            AuthError::ProviderUnavailable(_) => "identity provider unavailable",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::UNAUTHORIZED {
            (
                status,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                self.public_message(),
            )
                .into_response()
        } else {
            (status, self.public_message()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_unauthorized() {
        assert_eq!(AuthError::MissingCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::MalformedCredentials.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn provider_outage_maps_to_server_error() {
        let err = AuthError::ProviderUnavailable(DiscoveryError::Timeout);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn public_message_hides_causes() {
        let err = AuthError::ProviderUnavailable(DiscoveryError::IssuerMismatch {
            configured: "https://a".to_string(),
            discovered: "https://b".to_string(),
        });
        assert_eq!(err.public_message(), "identity provider unavailable");
    }
}
