//! Built-in application handlers.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::auth::verifier::Claims;
use crate::handlers::registry::AppHandler;

/// Plain-text greeting addressed to the verified identity.
pub struct Greet;

#[async_trait]
impl AppHandler for Greet {
    async fn handle(&self, claims: Claims) -> Response {
        (StatusCode::OK, format!("Hello, {}!", claims.identity())).into_response()
    }
}

/// Echoes the verified claim set back to the caller as JSON.
pub struct Whoami;

#[async_trait]
impl AppHandler for Whoami {
    async fn handle(&self, claims: Claims) -> Response {
        let mut body = serde_json::Map::new();
        body.insert("sub".to_string(), claims.sub.clone().into());
        if let Some(email) = &claims.email {
            body.insert("email".to_string(), email.clone().into());
        }
        for (name, value) in &claims.extra {
            body.insert(name.clone(), value.clone());
        }

        Json(serde_json::Value::Object(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(email: Option<&str>) -> Claims {
        Claims {
            sub: "user-1".to_string(),
            email: email.map(str::to_string),
            extra: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn greet_addresses_the_email_claim() {
        let response = Greet.handle(claims(Some("alice@example.com"))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Hello, alice@example.com!");
    }

    #[tokio::test]
    async fn greet_falls_back_to_the_subject() {
        let response = Greet.handle(claims(None)).await;
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Hello, user-1!");
    }

    #[tokio::test]
    async fn whoami_returns_the_claim_set() {
        let mut claims = claims(Some("alice@example.com"));
        claims
            .extra
            .insert("iss".to_string(), "https://accounts.example.com".into());

        let response = Whoami.handle(claims).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["sub"], "user-1");
        assert_eq!(value["email"], "alice@example.com");
        assert_eq!(value["iss"], "https://accounts.example.com");
    }
}
