//! Server execution logic.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::usecase::RoomCoordinator;

use super::{
    handler::{health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Study room signaling server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(coordinator, allowed_origin, heartbeat);
/// server.run("127.0.0.1:3001").await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(
        coordinator: Arc<RoomCoordinator>,
        allowed_origin: String,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                coordinator,
                allowed_origin,
                heartbeat_interval,
            }),
        }
    }

    /// Build the router with all endpoints and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .layer(self.cors_layer())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    fn cors_layer(&self) -> CorsLayer {
        match HeaderValue::from_str(&self.state.allowed_origin) {
            Ok(origin) => CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET]),
            Err(e) => {
                tracing::warn!(
                    "Invalid allowed origin '{}': {}; cross-origin requests disabled",
                    self.state.allowed_origin,
                    e
                );
                CorsLayer::new()
            }
        }
    }

    /// Bind to `bind_addr` and serve until Ctrl+C / SIGTERM.
    pub async fn run(self, bind_addr: &str) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(bind_addr).await?;

        tracing::info!(
            "Study room signaling server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Accepting browser origin: {}", self.state.allowed_origin);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until the task is dropped.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        axum::serve(listener, self.router()).await
    }
}
