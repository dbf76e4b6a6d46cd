//! Study room terminal client with reconnection support.
//!
//! Joins a room, bootstraps the peer mesh and mirrors the shared chat,
//! whiteboard and Pomodoro timer. Reconnects automatically on disconnection
//! (max 5 attempts with 5 second interval). A refused camera/microphone
//! ends the client without joining.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin studyroom-client -- --name Alice --room abc
//! cargo run --bin studyroom-client -- -n Bob -r abc
//! ```

use std::sync::Arc;

use clap::Parser;

use studyroom_client::{
    config::ClientConfig, media::SyntheticMedia, peer::SignalOnlyPeerFactory, run_client,
};
use studyroom_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = ClientConfig::parse();
    let media = Arc::new(SyntheticMedia::new(config.deny_media));

    if let Err(e) = run_client(config, media, Arc::new(SignalOnlyPeerFactory)).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
