//! Signaling wire protocol.
//!
//! Every WebSocket text frame carries exactly one event envelope:
//!
//! ```text
//! {"event": "join-room", "data": {"roomId": "abc", "userName": "Alice"}}
//! ```
//!
//! Payload field names follow the browser client (`roomId`, `callerID`,
//! `newState`, ...). Signal, chat and whiteboard payloads are opaque to the
//! server and are carried as raw JSON values.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Length of a work session in seconds (25 minutes).
pub const DEFAULT_WORK_SECONDS: u32 = 25 * 60;
/// Length of a break in seconds (5 minutes).
pub const DEFAULT_BREAK_SECONDS: u32 = 5 * 60;

/// Pomodoro phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PomodoroMode {
    Work,
    Break,
}

impl PomodoroMode {
    /// The phase that follows this one.
    pub fn toggled(self) -> Self {
        match self {
            Self::Work => Self::Break,
            Self::Break => Self::Work,
        }
    }
}

impl fmt::Display for PomodoroMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Work => f.write_str("WORK"),
            Self::Break => f.write_str("BREAK"),
        }
    }
}

/// Shared Pomodoro timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroState {
    pub mode: PomodoroMode,
    pub time_left: u32,
    pub is_running: bool,
}

impl PomodoroState {
    /// Stopped timer at the start of a work session.
    pub fn initial(work_seconds: u32) -> Self {
        Self {
            mode: PomodoroMode::Work,
            time_left: work_seconds,
            is_running: false,
        }
    }
}

impl Default for PomodoroState {
    fn default() -> Self {
        Self::initial(DEFAULT_WORK_SECONDS)
    }
}

/// A room member as seen on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendingSignalPayload {
    pub user_to_signal: String,
    #[serde(rename = "callerID")]
    pub caller_id: String,
    pub signal: Value,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturningSignalPayload {
    #[serde(rename = "callerID")]
    pub caller_id: String,
    pub signal: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub room_id: String,
    pub message: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPomodoroPayload {
    pub room_id: String,
    pub new_state: PomodoroState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteboardDrawPayload {
    pub room_id: String,
    pub data: Value,
}

/// Events sent by a client to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinRoom(JoinRoomPayload),
    SendingSignal(SendingSignalPayload),
    ReturningSignal(ReturningSignalPayload),
    SendChatMessage(ChatMessagePayload),
    /// Payload is the bare room id
    RequestChatHistory(String),
    SyncPomodoro(SyncPomodoroPayload),
    WhiteboardDraw(WhiteboardDrawPayload),
    /// Payload is the bare room id
    ClearWhiteboard(String),
    LeaveRoom,
}

impl ClientEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom(_) => "join-room",
            Self::SendingSignal(_) => "sending-signal",
            Self::ReturningSignal(_) => "returning-signal",
            Self::SendChatMessage(_) => "send-chat-message",
            Self::RequestChatHistory(_) => "request-chat-history",
            Self::SyncPomodoro(_) => "sync-pomodoro",
            Self::WhiteboardDraw(_) => "whiteboard-draw",
            Self::ClearWhiteboard(_) => "clear-whiteboard",
            Self::LeaveRoom => "leave-room",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedPayload {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatePayload {
    /// Earliest member still in the room
    pub host: Option<String>,
    pub whiteboard: Value,
    pub chat_history: Vec<Value>,
    pub pomodoro_state: PomodoroState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserJoinedPayload {
    pub signal: Value,
    #[serde(rename = "callerID")]
    pub caller_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnedSignalPayload {
    pub signal: Value,
    /// Connection that produced the answer
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLeftPayload {
    pub id: String,
}

/// Events sent by the server to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    Connected(ConnectedPayload),
    AllUsers(Vec<MemberInfo>),
    RoomState(RoomStatePayload),
    UserJoined(UserJoinedPayload),
    ReceivingReturnedSignal(ReturnedSignalPayload),
    ReceiveChatMessage(Value),
    ChatHistory(Vec<Value>),
    SyncPomodoro(PomodoroState),
    WhiteboardDraw(Value),
    ClearWhiteboard,
    UserLeft(UserLeftPayload),
}

impl ServerEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected(_) => "connected",
            Self::AllUsers(_) => "all-users",
            Self::RoomState(_) => "room-state",
            Self::UserJoined(_) => "user-joined",
            Self::ReceivingReturnedSignal(_) => "receiving-returned-signal",
            Self::ReceiveChatMessage(_) => "receive-chat-message",
            Self::ChatHistory(_) => "chat-history",
            Self::SyncPomodoro(_) => "sync-pomodoro",
            Self::WhiteboardDraw(_) => "whiteboard-draw",
            Self::ClearWhiteboard => "clear-whiteboard",
            Self::UserLeft(_) => "user-left",
        }
    }
}

macro_rules! impl_json_envelope {
    ($ty:ty) => {
        impl $ty {
            /// Serialize into a single text frame.
            pub fn to_json(&self) -> serde_json::Result<String> {
                serde_json::to_string(self)
            }
        }

        impl FromStr for $ty {
            type Err = serde_json::Error;

            fn from_str(s: &str) -> serde_json::Result<Self> {
                serde_json::from_str(s)
            }
        }
    };
}

impl_json_envelope!(ClientEvent);
impl_json_envelope!(ServerEvent);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_room_uses_browser_field_names() {
        // テスト項目: join-room がブラウザクライアントと同じフィールド名で解釈される
        // given (前提条件):
        let raw = r#"{"event":"join-room","data":{"roomId":"abc","userName":"Alice"}}"#;

        // when (操作):
        let event: ClientEvent = raw.parse().unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::JoinRoom(JoinRoomPayload {
                room_id: "abc".to_string(),
                user_name: "Alice".to_string(),
            })
        );
    }

    #[test]
    fn test_sending_signal_keeps_caller_id_casing() {
        // テスト項目: callerID の大文字表記がそのまま扱われる
        // given (前提条件):
        let raw = json!({
            "event": "sending-signal",
            "data": {"userToSignal": "b", "callerID": "a", "signal": {"type": "offer"}, "name": "Alice"}
        })
        .to_string();

        // when (操作):
        let event: ClientEvent = raw.parse().unwrap();

        // then (期待する結果):
        let ClientEvent::SendingSignal(payload) = event else {
            panic!("expected sending-signal");
        };
        assert_eq!(payload.caller_id, "a");
        assert_eq!(payload.user_to_signal, "b");
        assert_eq!(payload.signal, json!({"type": "offer"}));
    }

    #[test]
    fn test_request_chat_history_takes_bare_room_id() {
        // テスト項目: request-chat-history のペイロードは room id の文字列そのもの
        // given (前提条件):
        let raw = r#"{"event":"request-chat-history","data":"abc"}"#;

        // when (操作):
        let event: ClientEvent = raw.parse().unwrap();

        // then (期待する結果):
        assert_eq!(event, ClientEvent::RequestChatHistory("abc".to_string()));
    }

    #[test]
    fn test_leave_room_without_data() {
        // テスト項目: データを持たない leave-room が解釈できる
        // given (前提条件):
        let raw = r#"{"event":"leave-room"}"#;

        // when (操作):
        let event: ClientEvent = raw.parse().unwrap();

        // then (期待する結果):
        assert_eq!(event, ClientEvent::LeaveRoom);
    }

    #[test]
    fn test_malformed_payloads_are_rejected() {
        // テスト項目: 必須フィールドが欠けたペイロードや未知のイベントは解釈エラーになる
        // given (前提条件):
        let cases = [
            r#"{"event":"join-room","data":{"roomId":"abc"}}"#,
            r#"{"event":"sending-signal","data":{"userToSignal":"b","callerID":"a","name":"x"}}"#,
            r#"{"event":"sync-pomodoro","data":{"roomId":"abc","newState":{"mode":"nap","timeLeft":1,"isRunning":true}}}"#,
            r#"{"event":"sync-pomodoro","data":{"roomId":"abc","newState":{"mode":"work","timeLeft":-5,"isRunning":true}}}"#,
            r#"{"event":"teleport","data":{}}"#,
            "not json",
        ];

        for raw in cases {
            // when (操作):
            let result = raw.parse::<ClientEvent>();

            // then (期待する結果):
            assert!(result.is_err(), "should reject: {raw}");
        }
    }

    #[test]
    fn test_room_state_serializes_camel_case() {
        // テスト項目: room-state が camelCase でシリアライズされる
        // given (前提条件):
        let event = ServerEvent::RoomState(RoomStatePayload {
            host: Some("x".to_string()),
            whiteboard: Value::Null,
            chat_history: vec![],
            pomodoro_state: PomodoroState::default(),
        });

        // when (操作):
        let value: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({
                "event": "room-state",
                "data": {
                    "host": "x",
                    "whiteboard": null,
                    "chatHistory": [],
                    "pomodoroState": {"mode": "work", "timeLeft": 1500, "isRunning": false}
                }
            })
        );
    }

    #[test]
    fn test_pomodoro_mode_toggles() {
        // テスト項目: モードが work と break の間で切り替わる
        // given (前提条件):
        let mode = PomodoroMode::Work;

        // when (操作):
        let toggled = mode.toggled();

        // then (期待する結果):
        assert_eq!(toggled, PomodoroMode::Break);
        assert_eq!(toggled.toggled(), PomodoroMode::Work);
    }
}
