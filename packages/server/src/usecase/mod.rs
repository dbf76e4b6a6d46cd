//! UseCase 層
//!
//! One use case per signaling event family, plus `RoomCoordinator`, which
//! owns them and serialises every handler behind a single event gate.

pub mod chat;
pub mod connect_participant;
pub mod coordinator;
pub mod disconnect_participant;
pub mod error;
pub mod join_room;
pub mod relay_signal;
pub mod sync_pomodoro;
pub mod whiteboard;

pub use chat::ChatUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use coordinator::{RoomCoordinator, Session};
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{JoinRoomError, RelayError, RoomEventError};
pub use join_room::JoinRoomUseCase;
pub use relay_signal::RelaySignalUseCase;
pub use sync_pomodoro::SyncPomodoroUseCase;
pub use whiteboard::WhiteboardUseCase;

use studyroom_shared::protocol::ServerEvent;

use crate::domain::{ConnectionId, MessagePushError, RepositoryError, RoomId, RoomRepository};

/// ServerEvent を 1 フレームの JSON に変換
pub(crate) fn encode(event: &ServerEvent) -> Result<String, MessagePushError> {
    event
        .to_json()
        .map_err(|e| MessagePushError::PushFailed(format!("{}: {}", event.name(), e)))
}

/// ルームの送信者以外のメンバー（参加順）
pub(crate) async fn members_except(
    repository: &dyn RoomRepository,
    room_id: &RoomId,
    sender: &ConnectionId,
) -> Result<Vec<ConnectionId>, RepositoryError> {
    let members = repository.member_ids(room_id).await?;
    Ok(members.into_iter().filter(|id| id != sender).collect())
}
