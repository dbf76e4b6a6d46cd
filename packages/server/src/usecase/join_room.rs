//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - メンバー追加とスナップショット（all-users → room-state の順で本人にだけ送信）
//!
//! ### どのような状況を想定しているか
//! - 正常系：空ルームへの参加、既存メンバーがいるルームへの参加
//! - 異常系：空のルーム ID、空白の表示名
//! - エッジケース：既存メンバーには何も通知されない

use std::sync::Arc;

use studyroom_shared::protocol::{JoinRoomPayload, MemberInfo, RoomStatePayload, ServerEvent};

use crate::domain::{
    ConnectionId, DisplayName, Member, MessagePusher, RoomId, RoomRepository, RoomSnapshot,
};

use super::{encode, error::JoinRoomError};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// ルームに参加する
    ///
    /// ルームが存在しなければ作成する。既存メンバーへの通知は行わない
    /// （参加者自身がハンドシェイクを開始するまで既存メンバーは参加を知らない）。
    ///
    /// # Returns
    ///
    /// * `Ok((RoomId, DisplayName, RoomSnapshot))` - 参加したルームと送信したスナップショット
    /// * `Err(JoinRoomError)` - 参加失敗
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        payload: JoinRoomPayload,
    ) -> Result<(RoomId, DisplayName, RoomSnapshot), JoinRoomError> {
        let room_id = RoomId::new(payload.room_id)?;
        let name = DisplayName::new(payload.user_name)?;

        // 1. 追加とスナップショット取得は 1 回の Registry 操作で行う
        let snapshot = self
            .repository
            .add_member(&room_id, Member::new(connection_id.clone(), name.clone()))
            .await?;

        // 2. all-users → room-state の順に本人へ送信
        let all_users = ServerEvent::AllUsers(snapshot.others.iter().map(MemberInfo::from).collect());
        let room_state = ServerEvent::RoomState(RoomStatePayload::from(&snapshot));
        self.message_pusher
            .push_to(connection_id, &encode(&all_users)?)
            .await?;
        self.message_pusher
            .push_to(connection_id, &encode(&room_state)?)
            .await?;

        tracing::info!(
            "'{}' ({}) joined room '{}' with {} other member(s)",
            name.as_str(),
            connection_id,
            room_id,
            snapshot.others.len()
        );

        Ok((room_id, name, snapshot))
    }
}
