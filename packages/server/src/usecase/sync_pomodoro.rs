//! UseCase: Pomodoro 同期
//!
//! 受信した状態でルームの Pomodoro を上書きし、送信者以外に配る。
//! 時計はクライアント側で進むため、サーバーは最後に届いた状態を保持するだけ。

use std::sync::Arc;

use studyroom_shared::protocol::{PomodoroState, ServerEvent, SyncPomodoroPayload};

use crate::domain::{ConnectionId, MessagePusher, PomodoroPolicy, RoomId, RoomRepository};

use super::{encode, error::RoomEventError, members_except};

/// Pomodoro 同期のユースケース
pub struct SyncPomodoroUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    policy: PomodoroPolicy,
}

impl SyncPomodoroUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        policy: PomodoroPolicy,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            policy,
        }
    }

    /// 受信した状態を保存し、送信者以外に配る
    ///
    /// 送信者の状態をそのまま信用するわけではない:
    /// - `timeLeft` は `[0, max(work, break)]` に収めてから保存・配信する
    /// - 不正なルーム ID や存在しないルーム宛ては拒否し、何も配信しない
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        payload: SyncPomodoroPayload,
    ) -> Result<PomodoroState, RoomEventError> {
        let room_id = RoomId::new(payload.room_id)?;
        let state = self.policy.clamp(payload.new_state);
        if state != payload.new_state {
            tracing::debug!(
                "Clamped timeLeft {} -> {} in room '{}'",
                payload.new_state.time_left,
                state.time_left,
                room_id
            );
        }

        self.repository.set_pomodoro(&room_id, state).await?;

        let targets = members_except(self.repository.as_ref(), &room_id, sender).await?;
        self.message_pusher
            .broadcast(targets, &encode(&ServerEvent::SyncPomodoro(state))?)
            .await?;

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DisplayName, Member, message_pusher::MockMessagePusher},
        infrastructure::repository::InMemoryRoomRepository,
    };
    use studyroom_shared::protocol::PomodoroMode;

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    fn room_id() -> RoomId {
        RoomId::new("abc".to_string()).unwrap()
    }

    async fn repository_with(members: &[&str]) -> Arc<InMemoryRoomRepository> {
        let repository = Arc::new(InMemoryRoomRepository::default());
        for member in members {
            repository
                .add_member(
                    &room_id(),
                    Member::new(id(member), DisplayName::new(member.to_string()).unwrap()),
                )
                .await
                .unwrap();
        }
        repository
    }

    #[tokio::test]
    async fn test_sync_overwrites_and_broadcasts() {
        // テスト項目: 状態が上書きされ、送信者以外に sync-pomodoro が届く
        // given (前提条件):
        let repository = repository_with(&["x", "y"]).await;
        let mut mock = MockMessagePusher::new();
        mock.expect_broadcast()
            .withf(|targets, content| {
                targets.len() == 1
                    && targets[0].as_str() == "y"
                    && content.contains(r#""timeLeft":1499"#)
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase =
            SyncPomodoroUseCase::new(repository.clone(), Arc::new(mock), PomodoroPolicy::default());
        let new_state = PomodoroState {
            mode: PomodoroMode::Work,
            time_left: 1499,
            is_running: true,
        };

        // when (操作):
        let result = usecase
            .execute(
                &id("x"),
                SyncPomodoroPayload {
                    room_id: "abc".to_string(),
                    new_state,
                },
            )
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok(new_state));
        let room = repository.get_room(&room_id()).await.unwrap();
        assert_eq!(room.pomodoro, new_state);
    }

    #[tokio::test]
    async fn test_sync_clamps_time_left() {
        // テスト項目: 上限を超える timeLeft は max(work, break) に丸められる
        // given (前提条件):
        let repository = repository_with(&["x"]).await;
        let mut mock = MockMessagePusher::new();
        mock.expect_broadcast().returning(|_, _| Ok(()));
        let usecase =
            SyncPomodoroUseCase::new(repository.clone(), Arc::new(mock), PomodoroPolicy::default());

        // when (操作):
        let result = usecase
            .execute(
                &id("x"),
                SyncPomodoroPayload {
                    room_id: "abc".to_string(),
                    new_state: PomodoroState {
                        mode: PomodoroMode::Break,
                        time_left: 99_999,
                        is_running: false,
                    },
                },
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(result.time_left, 1500);
        assert_eq!(result.mode, PomodoroMode::Break);
    }

    #[tokio::test]
    async fn test_sync_missing_room_is_noop() {
        // テスト項目: 存在しないルームへの同期は何もしない
        // given (前提条件):
        let repository = repository_with(&[]).await;
        let mut mock = MockMessagePusher::new();
        mock.expect_broadcast().never();
        let usecase =
            SyncPomodoroUseCase::new(repository.clone(), Arc::new(mock), PomodoroPolicy::default());

        // when (操作):
        let result = usecase
            .execute(
                &id("x"),
                SyncPomodoroPayload {
                    room_id: "abc".to_string(),
                    new_state: PomodoroState::default(),
                },
            )
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RoomEventError::RoomNotFound("abc".to_string())));
        assert_eq!(repository.room_count().await, 0);
    }
}
