//! Conversion from domain entities to wire payloads.

use serde_json::Value;
use studyroom_shared::protocol::{MemberInfo, RoomStatePayload};

use crate::domain::{Member, RoomSnapshot};

impl From<&Member> for MemberInfo {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.as_str().to_string(),
            name: member.name.as_str().to_string(),
        }
    }
}

impl From<&RoomSnapshot> for RoomStatePayload {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            host: snapshot.host.as_ref().map(|id| id.as_str().to_string()),
            whiteboard: snapshot.whiteboard.clone().unwrap_or(Value::Null),
            chat_history: snapshot.chat_history.clone(),
            pomodoro_state: snapshot.pomodoro,
        }
    }
}
