//! Bearer token verification against a discovered provider.
//!
//! # Responsibilities
//! - Extract the token from the `Authorization` header (explicit scheme
//!   check before any slicing)
//! - Validate signature, issuer, audience and expiry against the
//!   provider's published keys
//! - Hand verified claims to the application handler
//!
//! # Design Decisions
//! - Validation runs entirely locally once keys are held; no network call
//!   per request
//! - Key selection follows the token's `kid` header; without one, every
//!   key matching the token's algorithm is tried
//! - The validated algorithm is always the key's declared algorithm, so a
//!   token cannot pick its own

use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::str::FromStr;

use crate::auth::error::{AuthError, DiscoveryError};
use crate::config::schema::OidcConfig;

const BEARER_PREFIX: &str = "Bearer ";

/// Verified attributes carried inside a validated token.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,

    #[serde(default)]
    pub email: Option<String>,

    /// Remaining claims, accessible by name.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// Display identity: the verified email when present, subject otherwise.
    pub fn identity(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.sub)
    }

    /// Look up a claim by name.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name)
    }
}

struct VerificationKey {
    kid: Option<String>,
    algorithm: Algorithm,
    key: DecodingKey,
}

/// Validation material for one provider: decoded signing keys plus the
/// expected issuer and audience. Reusable for any number of requests.
pub struct TokenVerifier {
    issuer: String,
    audience: String,
    leeway_secs: u64,
    keys: Vec<VerificationKey>,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material is not printable.
        f.debug_struct("TokenVerifier")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("keys", &self.keys.len())
            .finish()
    }
}

impl TokenVerifier {
    /// Build a verifier from a provider's published key set.
    ///
    /// Keys that cannot be decoded are skipped; a set with no usable key is
    /// a discovery failure.
    pub fn from_jwks(
        oidc: &OidcConfig,
        jwks: JwkSet,
        leeway_secs: u64,
    ) -> Result<Self, DiscoveryError> {
        let mut keys = Vec::new();

        for jwk in &jwks.keys {
            let Some(algorithm) = declared_algorithm(jwk) else {
                tracing::debug!(kid = ?jwk.common.key_id, "skipping jwk without a signing algorithm");
                continue;
            };

            let key = match DecodingKey::from_jwk(jwk) {
                Ok(key) => key,
                Err(err) => {
                    tracing::warn!(kid = ?jwk.common.key_id, error = %err, "skipping undecodable jwk");
                    continue;
                }
            };

            keys.push(VerificationKey {
                kid: jwk.common.key_id.clone(),
                algorithm,
                key,
            });
        }

        if keys.is_empty() {
            return Err(DiscoveryError::NoUsableKeys);
        }

        Ok(Self {
            issuer: oidc.issuer.clone(),
            audience: oidc.client_id.clone(),
            leeway_secs,
            keys,
        })
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Check a raw `Authorization` header value and return the verified
    /// claims.
    pub fn verify(&self, raw_authorization: Option<&str>) -> Result<Claims, AuthError> {
        let token = bearer_token(raw_authorization)?;
        self.verify_token(token)
    }

    /// Validate an already-extracted bearer token.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(AuthError::InvalidToken)?;

        let candidates: Vec<&VerificationKey> = match &header.kid {
            Some(kid) => self
                .keys
                .iter()
                .filter(|k| k.kid.as_deref() == Some(kid.as_str()))
                .collect(),
            None => self
                .keys
                .iter()
                .filter(|k| k.algorithm == header.alg)
                .collect(),
        };

        let mut last_error = None;
        for candidate in candidates {
            let mut validation = Validation::new(candidate.algorithm);
            validation.set_issuer(&[&self.issuer]);
            validation.set_audience(&[&self.audience]);
            validation.leeway = self.leeway_secs;

            match jsonwebtoken::decode::<Claims>(token, &candidate.key, &validation) {
                Ok(data) => return Ok(data.claims),
                Err(err) => last_error = Some(err),
            }
        }

        Err(AuthError::InvalidToken(last_error.unwrap_or_else(|| {
            jsonwebtoken::errors::ErrorKind::InvalidToken.into()
        })))
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme prefix is matched explicitly and case-sensitively; a header
/// shorter than the prefix is malformed, never sliced.
pub(crate) fn bearer_token(raw: Option<&str>) -> Result<&str, AuthError> {
    let raw = match raw {
        Some(value) if !value.is_empty() => value,
        _ => return Err(AuthError::MissingCredentials),
    };

    let token = raw
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MalformedCredentials)?;

    if token.is_empty() {
        return Err(AuthError::MalformedCredentials);
    }

    Ok(token)
}

/// Signing algorithm for a JWK: the declared `alg` when present, otherwise
/// the conventional default for the key family.
fn declared_algorithm(jwk: &Jwk) -> Option<Algorithm> {
    if let Some(key_algorithm) = jwk.common.key_algorithm {
        return Algorithm::from_str(&key_algorithm.to_string()).ok();
    }

    match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => Some(Algorithm::RS256),
        AlgorithmParameters::EllipticCurve(params) => match &params.curve {
            EllipticCurve::P256 => Some(Algorithm::ES256),
            EllipticCurve::P384 => Some(Algorithm::ES384),
            _ => None,
        },
        AlgorithmParameters::OctetKeyPair(_) => Some(Algorithm::EdDSA),
        AlgorithmParameters::OctetKey(_) => Some(Algorithm::HS256),
    }
}
