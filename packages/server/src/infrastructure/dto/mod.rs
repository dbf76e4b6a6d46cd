//! Data Transfer Objects.
//!
//! WebSocket frames use the shared `studyroom_shared::protocol` types;
//! `conversion` maps domain entities onto them.

pub mod conversion;
