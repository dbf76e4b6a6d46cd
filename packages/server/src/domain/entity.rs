//! Room entities.

use serde_json::Value;
use studyroom_shared::protocol::{DEFAULT_BREAK_SECONDS, DEFAULT_WORK_SECONDS, PomodoroState};

use super::{
    error::RepositoryError,
    value_object::{ConnectionId, DisplayName, RoomId, Timestamp},
};

/// One active connection participating in a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: ConnectionId,
    pub name: DisplayName,
}

impl Member {
    pub fn new(id: ConnectionId, name: DisplayName) -> Self {
        Self { id, name }
    }
}

/// Pomodoro durations applied to every room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PomodoroPolicy {
    pub work_seconds: u32,
    pub break_seconds: u32,
}

impl PomodoroPolicy {
    pub fn new(work_seconds: u32, break_seconds: u32) -> Self {
        Self {
            work_seconds,
            break_seconds,
        }
    }

    /// State of the timer in a freshly created room.
    pub fn initial_state(&self) -> PomodoroState {
        PomodoroState::initial(self.work_seconds)
    }

    /// Upper bound for `timeLeft`.
    pub fn max_seconds(&self) -> u32 {
        self.work_seconds.max(self.break_seconds)
    }

    /// Bring a client-supplied state back into `[0, max_seconds]`.
    pub fn clamp(&self, state: PomodoroState) -> PomodoroState {
        PomodoroState {
            time_left: state.time_left.min(self.max_seconds()),
            ..state
        }
    }
}

impl Default for PomodoroPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_SECONDS, DEFAULT_BREAK_SECONDS)
    }
}

/// Study room: roster plus the widget state replayed to joiners.
///
/// `members` keeps join order; the first entry is the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub members: Vec<Member>,
    /// Opaque chat records, in arrival order
    pub chat_history: Vec<Value>,
    /// Last whiteboard snapshot (last-write-wins)
    pub whiteboard: Option<Value>,
    pub pomodoro: PomodoroState,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(id: RoomId, pomodoro: PomodoroState, created_at: Timestamp) -> Self {
        Self {
            id,
            members: Vec::new(),
            chat_history: Vec::new(),
            whiteboard: None,
            pomodoro,
            created_at,
        }
    }

    /// Earliest member still present. Not stable across the host leaving.
    pub fn host(&self) -> Option<&ConnectionId> {
        self.members.first().map(|m| &m.id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn has_member(&self, id: &ConnectionId) -> bool {
        self.members.iter().any(|m| &m.id == id)
    }

    pub fn add_member(&mut self, member: Member) -> Result<(), RepositoryError> {
        if self.has_member(&member.id) {
            return Err(RepositoryError::MemberAlreadyExists(
                member.id.into_string(),
                self.id.as_str().to_string(),
            ));
        }
        self.members.push(member);
        Ok(())
    }

    /// Remove a member, returning it if it was present.
    pub fn remove_member(&mut self, id: &ConnectionId) -> Option<Member> {
        let index = self.members.iter().position(|m| &m.id == id)?;
        Some(self.members.remove(index))
    }

    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|m| m.id.clone()).collect()
    }

    /// Everything a joining connection needs, computed for `joiner`.
    pub fn snapshot_for(&self, joiner: &ConnectionId) -> RoomSnapshot {
        RoomSnapshot {
            others: self
                .members
                .iter()
                .filter(|m| &m.id != joiner)
                .cloned()
                .collect(),
            host: self.host().cloned(),
            whiteboard: self.whiteboard.clone(),
            chat_history: self.chat_history.clone(),
            pomodoro: self.pomodoro,
        }
    }
}

/// Roster and widget state handed to a joiner.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSnapshot {
    /// Existing members, join order, joiner excluded
    pub others: Vec<Member>,
    pub host: Option<ConnectionId>,
    pub whiteboard: Option<Value>,
    pub chat_history: Vec<Value>,
    pub pomodoro: PomodoroState,
}

/// Result of removing a member from a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRemoval {
    pub member: Member,
    /// Members still in the room, to be told about the departure
    pub remaining: Vec<ConnectionId>,
    pub room_deleted: bool,
}
