//! Study room signaling server.
//!
//! Keeps an in-memory registry of study rooms (roster, chat transcript,
//! whiteboard snapshot, Pomodoro timer) and relays WebRTC signaling between
//! room members over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
