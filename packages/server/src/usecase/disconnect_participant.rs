//! UseCase: 退出・切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::leave() / disconnect() メソッド
//! - メンバー削除、空ルームの削除、残りのメンバーへの user-left 通知
//!
//! ### なぜこのテストが必要か
//! - 最後のメンバーが抜けたルームが Registry に残らないこと
//! - 同じ接続の後始末を何度実行しても結果が変わらないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：2 人のルームから 1 人退出
//! - エッジケース：最後の 1 人の退出、未参加の接続の切断、二重の後始末

use std::sync::Arc;

use studyroom_shared::protocol::{ServerEvent, UserLeftPayload};

use crate::domain::{
    ConnectionId, MemberRemoval, MessagePusher, RepositoryError, RoomId, RoomRepository,
};

use super::{encode, error::RoomEventError};

/// 退出・切断のユースケース
pub struct DisconnectParticipantUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// ルームから退出する（接続は維持）
    ///
    /// # Returns
    ///
    /// * `Ok(Some(MemberRemoval))` - 退出した
    /// * `Ok(None)` - すでにメンバーではなかった（何もしない）
    /// * `Err(RoomEventError)` - `user-left` の送信に失敗
    pub async fn leave(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<Option<MemberRemoval>, RoomEventError> {
        let removal = match self.repository.remove_member(room_id, connection_id).await {
            Ok(removal) => removal,
            Err(RepositoryError::RoomNotFound(_) | RepositoryError::MemberNotFound(..)) => {
                tracing::debug!(
                    "{} is no longer a member of room '{}', nothing to clean up",
                    connection_id,
                    room_id
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let event = ServerEvent::UserLeft(UserLeftPayload {
            id: connection_id.as_str().to_string(),
        });
        self.message_pusher
            .broadcast(removal.remaining.clone(), &encode(&event)?)
            .await?;

        tracing::info!(
            "'{}' ({}) left room '{}'",
            removal.member.name.as_str(),
            connection_id,
            room_id
        );
        Ok(Some(removal))
    }

    /// 接続終了時の後始末
    ///
    /// 参加中のルームがあれば退出し、MessagePusher から登録を解除する。
    pub async fn disconnect(
        &self,
        connection_id: &ConnectionId,
        room_id: Option<&RoomId>,
    ) -> Result<Option<MemberRemoval>, RoomEventError> {
        let result = match room_id {
            Some(room_id) => self.leave(connection_id, room_id).await,
            None => Ok(None),
        };
        self.message_pusher.unregister_client(connection_id).await;
        result
    }
}
