//! Gateway server: router assembly and lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use redbridge_client::StoreClient;

use crate::handlers::{self, AppState};

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_address: String,
    pub port: u16,
    /// Shared secret expected as a bearer token
    pub token: String,
    pub enable_cors: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            token: "example_token".to_string(),
            enable_cors: true,
        }
    }
}

/// The HTTP gateway in front of the backing store.
pub struct Gateway {
    config: GatewayConfig,
    store: StoreClient,
}

impl Gateway {
    /// Create a gateway over an already-connected store handle.
    pub fn new(config: GatewayConfig, store: StoreClient) -> Self {
        Self { config, store }
    }

    /// Build the router.
    ///
    /// `/health` bypasses auth; the two batch endpoints and the generic
    /// fallback all pass through the auth gate in their handlers.
    pub fn router(&self) -> Router {
        let state = Arc::new(AppState {
            store: self.store.clone(),
            token: self.config.token.clone(),
        });

        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .route("/pipeline", post(handlers::pipeline))
            .route("/multi-exec", post(handlers::multi_exec))
            .fallback(handlers::command)
            .with_state(state);

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(Any)
                .allow_origin(Any);
            router = router.layer(cors);
        }

        router.layer(TraceLayer::new_for_http())
    }

    /// Run the server until a termination signal arrives, then close the
    /// store connection.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr =
            format!("{}:{}", self.config.bind_address, self.config.port).parse()?;

        info!("redbridge listening on {}", addr);
        info!("  /health      - health check (no auth)");
        info!("  /pipeline    - batched commands, single round trip");
        info!("  /multi-exec  - batched commands, atomic");
        info!("  /*           - single generic command");

        let store = self.store.clone();
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        store.disconnect().await;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received terminate signal, shutting down..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert!(config.enable_cors);
    }
}
