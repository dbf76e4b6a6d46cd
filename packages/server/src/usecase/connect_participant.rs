//! UseCase: 接続処理
//!
//! 接続ごとに新しい ConnectionId を払い出し、MessagePusher に登録して
//! `connected {id}` を本人に通知する。

use std::sync::Arc;

use studyroom_shared::protocol::{ConnectedPayload, ServerEvent};

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

use super::encode;

/// 接続のユースケース
pub struct ConnectParticipantUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 接続を登録する
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionId)` - 払い出した接続 ID
    /// * `Err(MessagePushError)` - `connected` の送信に失敗した
    pub async fn execute(&self, sender: PusherChannel) -> Result<ConnectionId, MessagePushError> {
        let connection_id = ConnectionId::generate();
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;

        let frame = encode(&ServerEvent::Connected(ConnectedPayload {
            id: connection_id.as_str().to_string(),
        }))?;
        if let Err(e) = self.message_pusher.push_to(&connection_id, &frame).await {
            self.message_pusher.unregister_client(&connection_id).await;
            return Err(e);
        }

        Ok(connection_id)
    }
}
