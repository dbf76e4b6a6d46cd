//! Message formatting utilities for client display.

use studyroom_shared::{
    protocol::{MemberInfo, PomodoroState},
    time::format_countdown,
};

use crate::{
    chat::ChatRecord,
    mesh::PeerSummary,
    peer::PeerRole,
};

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the roster received right after joining
    ///
    /// # Arguments
    ///
    /// * `room_id` - The joined room
    /// * `members` - Members that were already in the room (self excluded)
    ///
    /// # Returns
    ///
    /// A formatted string with the member list
    pub fn format_room_joined(room_id: &str, members: &[MemberInfo]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str(&format!("Room: {}\n", room_id));
        output.push_str("Members:\n");

        if members.is_empty() {
            output.push_str("(You are the first one here)\n");
        } else {
            for member in members {
                output.push_str(&format!("{} ({})\n", member.name, member.id));
            }
        }

        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Format the snapshot summary sent with `room-state`
    pub fn format_room_state(
        host: Option<&str>,
        self_id: Option<&str>,
        strokes: usize,
        messages: usize,
        pomodoro: &PomodoroState,
    ) -> String {
        let host = match (host, self_id) {
            (Some(host), Some(me)) if host == me => "you".to_string(),
            (Some(host), _) => host.to_string(),
            (None, _) => "-".to_string(),
        };
        format!(
            "host: {} | whiteboard: {} strokes | chat: {} messages | {}\n",
            host,
            strokes,
            messages,
            Self::format_pomodoro(pomodoro)
        )
    }

    pub fn format_member_joined(name: &str, id: &str) -> String {
        format!("\n+ {} ({}) joined\n", name, id)
    }

    pub fn format_member_left(name: Option<&str>, id: &str) -> String {
        match name {
            Some(name) => format!("\n- {} ({}) left\n", name, id),
            None => format!("\n- {} left\n", id),
        }
    }

    /// Format a chat message
    ///
    /// # Arguments
    ///
    /// * `record` - The message
    /// * `self_id` - Our connection id, to mark our own messages
    pub fn format_chat_message(record: &ChatRecord, self_id: Option<&str>) -> String {
        let me_suffix = if Some(record.id.as_str()) == self_id {
            " (me)"
        } else {
            ""
        };
        format!(
            "\n\n{}\n@{}{}: {}\nsent at {}\n{}\n",
            THIN_RULE, record.name, me_suffix, record.text, record.timestamp, THIN_RULE
        )
    }

    pub fn format_history(records: &[ChatRecord], self_id: Option<&str>) -> String {
        if records.is_empty() {
            return "\n(No messages yet)\n".to_string();
        }
        let mut output = String::from("\n");
        for record in records {
            let me_suffix = if Some(record.id.as_str()) == self_id {
                " (me)"
            } else {
                ""
            };
            output.push_str(&format!(
                "[{}] {}{}: {}\n",
                record.timestamp, record.name, me_suffix, record.text
            ));
        }
        output
    }

    /// `WORK 24:59 (running)`
    pub fn format_pomodoro(state: &PomodoroState) -> String {
        let status = if state.is_running { "running" } else { "paused" };
        format!(
            "{} {} ({})",
            state.mode,
            format_countdown(state.time_left),
            status
        )
    }

    pub fn format_timer_synced(state: &PomodoroState) -> String {
        format!("\n⏱ {}\n", Self::format_pomodoro(state))
    }

    pub fn format_whiteboard(strokes: usize) -> String {
        format!("\n✎ whiteboard updated ({} strokes)\n", strokes)
    }

    pub fn format_whiteboard_cleared() -> String {
        "\n✎ whiteboard cleared\n".to_string()
    }

    pub fn format_peers(peers: &[PeerSummary]) -> String {
        if peers.is_empty() {
            return "\n(No peers)\n".to_string();
        }
        let mut output = String::from("\n");
        for peer in peers {
            let role = match peer.role {
                PeerRole::Initiator => "initiator",
                PeerRole::Receiver => "receiver",
            };
            let state = if peer.connected { "connected" } else { "pending" };
            output.push_str(&format!(
                "{} ({}) - {}, {}\n",
                peer.name, peer.id, role, state
            ));
        }
        output
    }

    pub fn format_handshake_timeout(peer: &PeerSummary) -> String {
        format!(
            "\n! handshake with {} ({}) timed out, peer dropped\n",
            peer.name, peer.id
        )
    }

    pub fn format_peer_failure(id: &str, reason: &str) -> String {
        format!("\n! connection to {} failed: {}\n", id, reason)
    }

    pub fn format_screen_share(sharing: bool, peers: usize) -> String {
        if sharing {
            format!("\nScreen sharing started ({} peers)\n", peers)
        } else {
            format!("\nScreen sharing stopped ({} peers back on camera)\n", peers)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyroom_shared::protocol::PomodoroMode;

    fn record(id: &str, name: &str, text: &str) -> ChatRecord {
        ChatRecord {
            message_id: "m1".to_string(),
            kind: crate::chat::ChatKind::Text,
            id: id.to_string(),
            name: name.to_string(),
            text: text.to_string(),
            timestamp: "10:30".to_string(),
        }
    }

    #[test]
    fn test_format_room_joined_empty() {
        // テスト項目: 空の部屋に参加した場合、最初の参加者である旨が表示される
        // given (前提条件):
        let members = vec![];

        // when (操作):
        let result = MessageFormatter::format_room_joined("abc", &members);

        // then (期待する結果):
        assert!(result.contains("Room: abc"));
        assert!(result.contains("(You are the first one here)"));
        assert!(result.contains(RULE));
    }

    #[test]
    fn test_format_room_joined_lists_members() {
        // テスト項目: 既存メンバーが名前と ID で一覧表示される
        // given (前提条件):
        let members = vec![MemberInfo {
            id: "a".to_string(),
            name: "Alice".to_string(),
        }];

        // when (操作):
        let result = MessageFormatter::format_room_joined("abc", &members);

        // then (期待する結果):
        assert!(result.contains("Alice (a)"));
    }

    #[test]
    fn test_format_room_state_marks_self_as_host() {
        // テスト項目: 自分がホストの場合は "you" と表示される
        // given (前提条件):
        let state = PomodoroState::default();

        // when (操作):
        let result = MessageFormatter::format_room_state(Some("a"), Some("a"), 3, 2, &state);

        // then (期待する結果):
        assert!(result.contains("host: you"));
        assert!(result.contains("3 strokes"));
        assert!(result.contains("2 messages"));
        assert!(result.contains("WORK 25:00 (paused)"));
    }

    #[test]
    fn test_format_chat_message_marks_own() {
        // テスト項目: 自分のメッセージには (me) が付き、他人のものには付かない
        // given (前提条件):
        let mine = record("a", "Alice", "hi");
        let theirs = record("b", "Bob", "yo");

        // when (操作):
        let mine = MessageFormatter::format_chat_message(&mine, Some("a"));
        let theirs = MessageFormatter::format_chat_message(&theirs, Some("a"));

        // then (期待する結果):
        assert!(mine.contains("@Alice (me): hi"));
        assert!(mine.contains("sent at 10:30"));
        assert!(theirs.contains("@Bob: yo"));
    }

    #[test]
    fn test_format_history() {
        // テスト項目: 履歴が時刻付きで一覧表示され、空の場合はその旨が表示される
        // given (前提条件):
        let records = vec![record("b", "Bob", "first")];

        // when (操作):
        let result = MessageFormatter::format_history(&records, None);
        let empty = MessageFormatter::format_history(&[], None);

        // then (期待する結果):
        assert!(result.contains("[10:30] Bob: first"));
        assert!(empty.contains("No messages yet"));
    }

    #[test]
    fn test_format_pomodoro() {
        // テスト項目: Pomodoro の状態がモード・残り時間・動作状態で表示される
        // given (前提条件):
        let state = PomodoroState {
            mode: PomodoroMode::Break,
            time_left: 65,
            is_running: true,
        };

        // when (操作):
        let result = MessageFormatter::format_pomodoro(&state);

        // then (期待する結果):
        assert_eq!(result, "BREAK 01:05 (running)");
    }

    #[test]
    fn test_format_peers() {
        // テスト項目: ピア一覧に役割と接続状態が表示される
        // given (前提条件):
        let peers = vec![PeerSummary {
            id: "a".to_string(),
            name: "Alice".to_string(),
            role: PeerRole::Initiator,
            connected: false,
        }];

        // when (操作):
        let result = MessageFormatter::format_peers(&peers);

        // then (期待する結果):
        assert!(result.contains("Alice (a) - initiator, pending"));
    }

    #[test]
    fn test_format_member_left_without_name() {
        // テスト項目: 名前が分からない退出者は ID のみで表示される
        // given (前提条件):
        let id = "zzz";

        // when (操作):
        let result = MessageFormatter::format_member_left(None, id);

        // then (期待する結果):
        assert_eq!(result, "\n- zzz left\n");
    }
}
