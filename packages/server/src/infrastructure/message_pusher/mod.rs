//! Frame delivery implementations.
//!
//! - `websocket`: per-connection unbounded channels drained into WebSocket sinks

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
