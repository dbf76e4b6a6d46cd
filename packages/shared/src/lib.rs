//! Code shared by the study room server and client.
//!
//! - `protocol`: the JSON event envelope exchanged over the signaling socket
//! - `logger`: tracing subscriber setup for both binaries
//! - `time`: clock abstraction and timestamp helpers

pub mod logger;
pub mod protocol;
pub mod time;
