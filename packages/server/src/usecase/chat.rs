//! UseCase: チャット
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ChatUseCase::send() / ChatUseCase::history()
//!
//! ### なぜこのテストが必要か
//! - 送信者以外のルームメンバーにだけブロードキャストされること
//! - 履歴が到着順に追記され、途中から参加した人にも同じ順序で渡ること
//!
//! ### どのような状況を想定しているか
//! - 正常系：3 人のルームでの送信、履歴要求
//! - エッジケース：送信者しかいないルーム、存在しないルーム

use std::sync::Arc;

use serde_json::Value;
use studyroom_shared::protocol::{ChatMessagePayload, ServerEvent};

use crate::domain::{ConnectionId, MessagePusher, RoomId, RoomRepository};

use super::{encode, error::RoomEventError, members_except};

/// チャットのユースケース
pub struct ChatUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ChatUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// メッセージを履歴に追加し、送信者以外に `receive-chat-message` を送る
    ///
    /// サーバーは送信者へエコーしない。メッセージ本体は解釈しない。
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - ブロードキャスト対象
    /// * `Err(RoomEventError)` - ルームが存在しない等
    pub async fn send(
        &self,
        sender: &ConnectionId,
        payload: ChatMessagePayload,
    ) -> Result<Vec<ConnectionId>, RoomEventError> {
        let room_id = RoomId::new(payload.room_id)?;
        let event = ServerEvent::ReceiveChatMessage(payload.message.clone());

        self.repository
            .append_chat_message(&room_id, payload.message)
            .await?;

        let targets = members_except(self.repository.as_ref(), &room_id, sender).await?;
        self.message_pusher
            .broadcast(targets.clone(), &encode(&event)?)
            .await?;

        Ok(targets)
    }

    /// 履歴全体を要求者本人にだけ `chat-history` として返す
    pub async fn history(
        &self,
        sender: &ConnectionId,
        room_id: String,
    ) -> Result<Vec<Value>, RoomEventError> {
        let room_id = RoomId::new(room_id)?;
        let history = self.repository.chat_history(&room_id).await?;

        self.message_pusher
            .push_to(sender, &encode(&ServerEvent::ChatHistory(history.clone()))?)
            .await?;

        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{DisplayName, Member, message_pusher::MockMessagePusher},
        infrastructure::repository::InMemoryRoomRepository,
    };
    use serde_json::json;

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

    fn chat(text: &str) -> ChatMessagePayload {
        ChatMessagePayload {
            room_id: "abc".to_string(),
            message: json!({"type": "text", "text": text}),
        }
    }

    #[tokio::test]
    async fn test_send_excludes_sender() {
        // テスト項目: 送信者以外のメンバーにだけブロードキャストされる
        // given (前提条件):
        let repository = repository_with(&["alice", "bob", "charlie"]).await;
        let mut mock = MockMessagePusher::new();
        mock.expect_broadcast()
            .withf(|targets, content| {
                targets.len() == 2
                    && !targets.iter().any(|t| t.as_str() == "alice")
                    && content.contains("receive-chat-message")
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = ChatUseCase::new(repository.clone(), Arc::new(mock));

        // when (操作):
        let result = usecase.send(&id("alice"), chat("hi")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(vec![id("bob"), id("charlie")]));
        let history = repository.chat_history(&room_id()).await.unwrap();
        assert_eq!(history, vec![json!({"type": "text", "text": "hi"})]);
    }

    #[tokio::test]
    async fn test_send_with_only_sender_in_room() {
        // テスト項目: 送信者しかいない場合、ブロードキャスト対象は空だが履歴には追加される
        // given (前提条件):
        let repository = repository_with(&["alice"]).await;
        let mut mock = MockMessagePusher::new();
        mock.expect_broadcast()
            .withf(|targets, _| targets.is_empty())
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = ChatUseCase::new(repository.clone(), Arc::new(mock));

        // when (操作):
        let result = usecase.send(&id("alice"), chat("hi")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(vec![]));
        assert_eq!(repository.chat_history(&room_id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_to_missing_room_is_rejected() {
        // テスト項目: 存在しないルームへの送信は何もせず RoomNotFound を返す
        // given (前提条件):
        let repository = repository_with(&[]).await;
        let mut mock = MockMessagePusher::new();
        mock.expect_broadcast().never();
        let usecase = ChatUseCase::new(repository.clone(), Arc::new(mock));

        // when (操作):
        let result = usecase.send(&id("alice"), chat("hi")).await;

        // then (期待する結果):
        assert_eq!(result, Err(RoomEventError::RoomNotFound("abc".to_string())));
        assert_eq!(repository.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_history_preserves_arrival_order() {
        // テスト項目: 履歴は到着順のまま本人にだけ返される
        // given (前提条件):
        let repository = repository_with(&["alice", "bob"]).await;
        let mut mock = MockMessagePusher::new();
        mock.expect_broadcast().times(3).returning(|_, _| Ok(()));
        mock.expect_push_to()
            .withf(|target, content| target.as_str() == "bob" && content.contains("chat-history"))
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = ChatUseCase::new(repository, Arc::new(mock));
        usecase.send(&id("alice"), chat("1")).await.unwrap();
        usecase.send(&id("bob"), chat("2")).await.unwrap();
        usecase.send(&id("alice"), chat("3")).await.unwrap();

        // when (操作):
        let history = usecase.history(&id("bob"), "abc".to_string()).await.unwrap();

        // then (期待する結果):
        let texts: Vec<&str> = history.iter().filter_map(|m| m["text"].as_str()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }
}
