//! Axum front end: WebSocket signaling endpoint and a health check.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
