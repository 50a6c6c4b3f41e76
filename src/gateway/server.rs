//! Gateway route table and HTTP serving.
//!
//! # Responsibilities
//! - Resolve declared endpoints into guarded behaviors (fail-fast)
//! - Own the route table: written during registration, read-only serving
//! - Build the axum Router and middleware stack
//! - Serve plain TCP or TLS until shutdown
//!
//! # Design Decisions
//! - Registration happens entirely before serving; a single bad endpoint
//!   aborts startup rather than leaving a partial table
//! - A duplicate (path, method) declaration replaces the earlier one and is
//!   logged; uniqueness is the config author's concern

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, Method};
use axum::routing::{MethodFilter, MethodRouter};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::cache::VerifierCache;
use crate::config::schema::{EndpointSpec, GatewayConfig, TlsConfig};
use crate::gateway::request_id::MakeRequestUuid;
use crate::handlers::guard::AuthenticatedEndpoint;
use crate::handlers::registry::{self, RegistryError};

/// Error type for gateway construction and serving.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("unsupported method '{0}'")]
    UnsupportedMethod(String),

    #[error("path '{0}' must start with '/'")]
    InvalidPath(String),

    #[error("failed to build discovery client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

struct RouteEntry {
    method: Method,
    filter: MethodFilter,
    endpoint: Arc<AuthenticatedEndpoint>,
}

/// Owns the route table: mutated only during registration, frozen into an
/// axum router for serving.
pub struct Gateway {
    routes: HashMap<String, Vec<RouteEntry>>,
    verifiers: Arc<VerifierCache>,
    request_timeout: Duration,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("routes", &self.routes.len())
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Create an empty gateway with a shared verifier cache.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            routes: HashMap::new(),
            verifiers: Arc::new(VerifierCache::new(&config.verifier)?),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        })
    }

    /// Build a gateway with every declared endpoint registered.
    ///
    /// The first registration failure aborts construction, so the process
    /// never serves a partially-registered table.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut gateway = Self::new(config)?;
        for spec in &config.endpoints {
            gateway.register_endpoint(spec)?;
        }
        Ok(gateway)
    }

    /// Register one declared endpoint: resolve its handler name and bind the
    /// guarded behavior to (path, method).
    pub fn register_endpoint(&mut self, spec: &EndpointSpec) -> Result<(), GatewayError> {
        if !spec.path.starts_with('/') {
            return Err(GatewayError::InvalidPath(spec.path.clone()));
        }

        let method = Method::from_bytes(spec.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| GatewayError::UnsupportedMethod(spec.method.clone()))?;
        let filter = MethodFilter::try_from(method.clone())
            .map_err(|_| GatewayError::UnsupportedMethod(spec.method.clone()))?;

        let endpoint =
            registry::resolve(&spec.handler, spec.oidc.clone(), Arc::clone(&self.verifiers))?;

        let entries = self.routes.entry(spec.path.clone()).or_default();
        if entries.iter().any(|entry| entry.method == method) {
            tracing::warn!(
                path = %spec.path,
                method = %method,
                "duplicate endpoint declaration replaces the earlier one"
            );
            entries.retain(|entry| entry.method != method);
        }

        tracing::info!(
            path = %spec.path,
            method = %method,
            handler = %spec.handler,
            issuer = %spec.oidc.issuer,
            "endpoint registered"
        );

        entries.push(RouteEntry {
            method,
            filter,
            endpoint: Arc::new(endpoint),
        });

        Ok(())
    }

    /// Number of registered (path, method) pairs.
    pub fn route_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    /// Freeze the route table into an axum router with the middleware stack.
    fn into_router(self) -> Router {
        let mut router = Router::new();

        for (path, entries) in self.routes {
            let mut method_router = MethodRouter::new();
            for entry in entries {
                let endpoint = entry.endpoint;
                method_router = method_router.on(entry.filter, move |headers: HeaderMap| {
                    let endpoint = Arc::clone(&endpoint);
                    async move { endpoint.call(&headers).await }
                });
            }
            router = router.route(&path, method_router);
        }

        router
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
    }

    /// Run the gateway, accepting connections on the given listener until
    /// shutdown or a fatal transport error.
    pub async fn run(self, listener: TcpListener) -> Result<(), GatewayError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, routes = self.route_count(), "gateway serving");

        let app = self.into_router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("gateway stopped");
        Ok(())
    }

    /// Run the gateway over TLS.
    pub async fn run_tls(self, addr: SocketAddr, tls: &TlsConfig) -> Result<(), GatewayError> {
        let rustls = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;
        tracing::info!(address = %addr, routes = self.route_count(), "gateway serving (tls)");

        let app = self.into_router();
        axum_server::bind_rustls(addr, rustls)
            .serve(app.into_make_service())
            .await?;

        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("shutdown signal received");
}
