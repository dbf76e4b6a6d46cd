//! Room Registry interface.
//!
//! The use cases depend on this trait only, so the backing store can be
//! swapped (e.g. for an external key-value / pub-sub store when running
//! several server instances) without touching the coordinator.
//!
//! Every method is a single atomic step against the registry. Compound
//! operations that must not observe a torn state (join + snapshot,
//! leave + delete-if-empty) are exposed as one method each. Rooms are only
//! ever created by `add_member` and deleted by `remove_member`, so a room
//! exists exactly while it has members.

use async_trait::async_trait;
use serde_json::Value;
use studyroom_shared::protocol::PomodoroState;

use super::{
    ConnectionId, Member, MemberRemoval, RepositoryError, RoomId, RoomSnapshot,
};

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Create the room if needed, append `member` and return the snapshot
    /// the member sees.
    async fn add_member(
        &self,
        room_id: &RoomId,
        member: Member,
    ) -> Result<RoomSnapshot, RepositoryError>;

    /// Remove a member and delete the room if it became empty.
    async fn remove_member(
        &self,
        room_id: &RoomId,
        member_id: &ConnectionId,
    ) -> Result<MemberRemoval, RepositoryError>;

    /// Connection ids of all members, join order.
    async fn member_ids(&self, room_id: &RoomId) -> Result<Vec<ConnectionId>, RepositoryError>;

    async fn append_chat_message(
        &self,
        room_id: &RoomId,
        message: Value,
    ) -> Result<(), RepositoryError>;

    async fn chat_history(&self, room_id: &RoomId) -> Result<Vec<Value>, RepositoryError>;

    async fn set_pomodoro(
        &self,
        room_id: &RoomId,
        state: PomodoroState,
    ) -> Result<(), RepositoryError>;

    /// Replace the whiteboard snapshot; `None` clears it.
    async fn set_whiteboard(
        &self,
        room_id: &RoomId,
        data: Option<Value>,
    ) -> Result<(), RepositoryError>;
}
