//! Error types for the study room client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Camera / microphone could not be acquired; joining is blocked
    #[error("Media unavailable: {0}")]
    Media(#[from] MediaError),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Local media acquisition errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("permission to use {0} was denied")]
    PermissionDenied(&'static str),

    #[error("no {0} device available")]
    NoDevice(&'static str),
}

/// Peer handshake errors. The affected peer is dropped; there is no retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerError {
    #[error("malformed signal: {0}")]
    InvalidSignal(String),

    #[error("unexpected {signal} signal while {state}")]
    UnexpectedSignal {
        signal: String,
        state: &'static str,
    },

    #[error("peer connection already closed")]
    Closed,
}

/// Errors in a line typed at the prompt
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown command '/{0}' (type /help)")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("coordinate {0} is outside 0.0..=1.0")]
    OutOfRange(f64),

    #[error("not joined to the room yet")]
    NotJoined,

    #[error("screen share is {0}")]
    ShareState(&'static str),

    #[error(transparent)]
    Media(#[from] MediaError),
}
