//! UseCase: ホワイトボード
//!
//! スナップショットは丸ごと上書き（last-write-wins）。マージはしない。

use std::sync::Arc;

use studyroom_shared::protocol::{ServerEvent, WhiteboardDrawPayload};

use crate::domain::{ConnectionId, MessagePusher, RoomId, RoomRepository};

use super::{encode, error::RoomEventError, members_except};

/// ホワイトボードのユースケース
pub struct WhiteboardUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl WhiteboardUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// スナップショットを保存し、送信者以外に `whiteboard-draw` を送る
    pub async fn draw(
        &self,
        sender: &ConnectionId,
        payload: WhiteboardDrawPayload,
    ) -> Result<Vec<ConnectionId>, RoomEventError> {
        let room_id = RoomId::new(payload.room_id)?;
        let event = ServerEvent::WhiteboardDraw(payload.data.clone());

        self.repository
            .set_whiteboard(&room_id, Some(payload.data))
            .await?;

        self.fan_out(sender, &room_id, &event).await
    }

    /// スナップショットを消去し、送信者以外に `clear-whiteboard` を送る
    pub async fn clear(
        &self,
        sender: &ConnectionId,
        room_id: String,
    ) -> Result<Vec<ConnectionId>, RoomEventError> {
        let room_id = RoomId::new(room_id)?;
        self.repository.set_whiteboard(&room_id, None).await?;
        tracing::debug!("Whiteboard cleared in room '{}' by {}", room_id, sender);

        self.fan_out(sender, &room_id, &ServerEvent::ClearWhiteboard)
            .await
    }

    async fn fan_out(
        &self,
        sender: &ConnectionId,
        room_id: &RoomId,
        event: &ServerEvent,
    ) -> Result<Vec<ConnectionId>, RoomEventError> {
        let targets = members_except(self.repository.as_ref(), room_id, sender).await?;
        self.message_pusher
            .broadcast(targets.clone(), &encode(event)?)
            .await?;
        Ok(targets)
    }
}
