//! Terminal client for study rooms.
//!
//! Joins a room over the signaling socket, bootstraps one peer connection
//! per member and keeps the chat, whiteboard and Pomodoro timer in sync.

pub mod chat;
pub mod command;
pub mod config;
pub mod error;
pub mod media;
pub mod mesh;
pub mod peer;
pub mod pomodoro;
pub mod room;
pub mod session;
pub mod whiteboard;

mod domain;
mod formatter;
mod runner;
mod ui;

pub use runner::run_client;
