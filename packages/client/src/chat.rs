//! Room chat transcript.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use studyroom_shared::time::timestamp_to_local_hh_mm;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Text,
}

/// One chat message as exchanged with browser clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRecord {
    pub message_id: String,
    #[serde(rename = "type")]
    pub kind: ChatKind,
    /// Connection id of the sender
    pub id: String,
    pub name: String,
    pub text: String,
    /// Sender's wall clock, `HH:MM`
    pub timestamp: String,
}

/// Append-only transcript
#[derive(Debug, Default)]
pub struct ChatLog {
    records: Vec<ChatRecord>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a message from the local user.
    pub fn compose(sender_id: &str, name: &str, text: &str, sent_at_millis: i64) -> ChatRecord {
        ChatRecord {
            message_id: Uuid::new_v4().to_string(),
            kind: ChatKind::Text,
            id: sender_id.to_string(),
            name: name.to_string(),
            text: text.trim().to_string(),
            timestamp: timestamp_to_local_hh_mm(sent_at_millis),
        }
    }

    /// The server does not echo our own messages, so they are appended here.
    pub fn push_local(&mut self, record: ChatRecord) {
        self.records.push(record);
    }

    /// Append a message relayed by the server.
    pub fn receive(&mut self, message: Value) -> Result<&ChatRecord, serde_json::Error> {
        let record: ChatRecord = serde_json::from_value(message)?;
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Replace the transcript with the server's history. Entries that are
    /// not chat records are skipped. Returns how many were kept.
    pub fn replace_history(&mut self, history: Vec<Value>) -> usize {
        self.records = history
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed chat history entry: {}", e);
                    None
                }
            })
            .collect();
        self.records.len()
    }

    pub fn records(&self) -> &[ChatRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compose_matches_browser_shape() {
        // テスト項目: 作成したメッセージがブラウザクライアントと同じ形でシリアライズされる
        // given (前提条件):
        let record = ChatLog::compose("a", "Alice", "  hi  ", 1_672_498_800_000);

        // when (操作):
        let value = serde_json::to_value(&record).unwrap();

        // then (期待する結果):
        assert_eq!(value["type"], "text");
        assert_eq!(value["id"], "a");
        assert_eq!(value["name"], "Alice");
        assert_eq!(value["text"], "hi");
        assert!(value["messageId"].as_str().is_some());
        assert_eq!(value["timestamp"].as_str().unwrap().len(), 5);
    }

    #[test]
    fn test_receive_appends_in_order() {
        // テスト項目: 受信したメッセージが到着順に追加される
        // given (前提条件):
        let mut log = ChatLog::new();
        log.push_local(ChatLog::compose("a", "Alice", "first", 0));

        // when (操作):
        let received = log
            .receive(json!({
                "messageId": "m2", "type": "text", "id": "b",
                "name": "Bob", "text": "second", "timestamp": "10:00"
            }))
            .unwrap()
            .clone();

        // then (期待する結果):
        assert_eq!(received.name, "Bob");
        let texts: Vec<&str> = log.records().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_receive_rejects_foreign_shape() {
        // テスト項目: チャットレコードでないメッセージは追加されない
        // given (前提条件):
        let mut log = ChatLog::new();

        // when (操作):
        let result = log.receive(json!({"text": "hi"}));

        // then (期待する結果):
        assert!(result.is_err());
        assert!(log.records().is_empty());
    }

    #[test]
    fn test_history_replaces_transcript() {
        // テスト項目: chat-history で手元の履歴が置き換えられ、不正なエントリは除外される
        // given (前提条件):
        let mut log = ChatLog::new();
        log.push_local(ChatLog::compose("a", "Alice", "old", 0));
        let history = vec![
            json!({"messageId": "m1", "type": "text", "id": "b", "name": "Bob", "text": "x", "timestamp": "09:00"}),
            json!("garbage"),
        ];

        // when (操作):
        let kept = log.replace_history(history);

        // then (期待する結果):
        assert_eq!(kept, 1);
        assert_eq!(log.records()[0].message_id, "m1");
    }
}
