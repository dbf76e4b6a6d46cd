//! Study room signaling server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin studyroom-server
//! cargo run --bin studyroom-server -- --host 0.0.0.0 --port 3001 --allowed-origin https://example.com
//! ```

use std::sync::Arc;

use clap::Parser;
use studyroom_server::{
    config::ServerConfig,
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::Server,
    usecase::RoomCoordinator,
};
use studyroom_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = ServerConfig::parse();

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases (RoomCoordinator)
    // 4. Server

    // 1. Create Repository (in-memory room registry)
    let policy = config.pomodoro_policy();
    let repository = Arc::new(InMemoryRoomRepository::new(policy));

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let coordinator = Arc::new(RoomCoordinator::new(repository, message_pusher, policy));

    // 4. Create and run the server
    let server = Server::new(
        coordinator,
        config.allowed_origin.clone(),
        config.heartbeat_interval(),
    );
    if let Err(e) = server.run(&config.bind_addr()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
