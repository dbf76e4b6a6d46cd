//! UseCase: シグナル中継
//!
//! サーバーはシグナル本体を解釈せず、宛先の 1 接続にだけ転送する。

use std::sync::Arc;

use studyroom_shared::protocol::{
    ReturnedSignalPayload, ReturningSignalPayload, SendingSignalPayload, ServerEvent,
    UserJoinedPayload,
};

use crate::domain::{ConnectionId, MessagePusher};

use super::{encode, error::RelayError};

/// シグナル中継のユースケース
pub struct RelaySignalUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelaySignalUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// `sending-signal` を `userToSignal` に `user-joined` として転送する
    ///
    /// 単純な中継ではない点が 1 つある: 転送先に渡す `callerID` は
    /// ペイロードの値ではなく、送信者の実際の接続 ID で上書きする。
    /// 受信側のアンサーは必ずオファーを送った接続に戻る。
    pub async fn send_offer(
        &self,
        sender: &ConnectionId,
        payload: SendingSignalPayload,
    ) -> Result<ConnectionId, RelayError> {
        let target = ConnectionId::new(payload.user_to_signal)?;
        if payload.caller_id != sender.as_str() {
            tracing::debug!(
                "callerID '{}' does not match sender '{}', using sender",
                payload.caller_id,
                sender
            );
        }

        let event = ServerEvent::UserJoined(UserJoinedPayload {
            signal: payload.signal,
            caller_id: sender.as_str().to_string(),
            name: payload.name,
        });
        self.message_pusher
            .push_to(&target, &encode(&event)?)
            .await?;

        tracing::debug!("Relayed offer {} -> {}", sender, target);
        Ok(target)
    }

    /// `returning-signal` を `callerID` に `receiving-returned-signal` として転送する
    pub async fn send_answer(
        &self,
        sender: &ConnectionId,
        payload: ReturningSignalPayload,
    ) -> Result<ConnectionId, RelayError> {
        let target = ConnectionId::new(payload.caller_id)?;

        let event = ServerEvent::ReceivingReturnedSignal(ReturnedSignalPayload {
            signal: payload.signal,
            id: sender.as_str().to_string(),
        });
        self.message_pusher
            .push_to(&target, &encode(&event)?)
            .await?;

        tracing::debug!("Relayed answer {} -> {}", sender, target);
        Ok(target)
    }
}
