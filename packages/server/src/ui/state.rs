//! Shared application state.

use std::{sync::Arc, time::Duration};

use crate::usecase::RoomCoordinator;

/// Shared application state
pub struct AppState {
    /// RoomCoordinator（シグナリングイベントの処理）
    pub coordinator: Arc<RoomCoordinator>,
    /// Browser origin allowed to open `/ws`
    pub allowed_origin: String,
    pub heartbeat_interval: Duration,
}
