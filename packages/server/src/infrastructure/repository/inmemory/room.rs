//! In-memory Room Registry.
//!
//! A `HashMap` behind one tokio `Mutex`. Each trait method takes the lock
//! once, so join-and-snapshot and leave-and-delete are atomic with respect
//! to every other connection. Not shared between processes.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use studyroom_shared::{
    protocol::PomodoroState,
    time::{Clock, SystemClock, timestamp_to_rfc3339},
};
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, Member, MemberRemoval, PomodoroPolicy, RepositoryError, Room, RoomId,
    RoomRepository, RoomSnapshot, Timestamp,
};

pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<RoomId, Room>>,
    policy: PomodoroPolicy,
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomRepository {
    pub fn new(policy: PomodoroPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: PomodoroPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            policy,
            clock,
        }
    }

    /// Look up a room without creating it.
    pub async fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).cloned()
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    fn new_room(&self, room_id: &RoomId) -> Room {
        let created_at = Timestamp::new(self.clock.now_millis());
        tracing::info!(
            "Room created: {} at {}",
            room_id,
            timestamp_to_rfc3339(created_at.value())
        );
        Room::new(room_id.clone(), self.policy.initial_state(), created_at)
    }

    /// Run `f` against an existing room.
    async fn with_room<T>(
        &self,
        room_id: &RoomId,
        f: impl FnOnce(&mut Room) -> T + Send,
    ) -> Result<T, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        rooms
            .get_mut(room_id)
            .map(f)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new(PomodoroPolicy::default())
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn add_member(
        &self,
        room_id: &RoomId,
        member: Member,
    ) -> Result<RoomSnapshot, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .entry(room_id.clone())
            .or_insert_with(|| self.new_room(room_id));

        let joiner = member.id.clone();
        room.add_member(member)?;
        Ok(room.snapshot_for(&joiner))
    }

    async fn remove_member(
        &self,
        room_id: &RoomId,
        member_id: &ConnectionId,
    ) -> Result<MemberRemoval, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))?;

        let member = room.remove_member(member_id).ok_or_else(|| {
            RepositoryError::MemberNotFound(
                member_id.as_str().to_string(),
                room_id.as_str().to_string(),
            )
        })?;
        let remaining = room.member_ids();

        let room_deleted = room.is_empty();
        if room_deleted {
            let open_millis = self.clock.now_millis() - room.created_at.value();
            rooms.remove(room_id);
            tracing::info!("Room deleted: {} (open for {} s)", room_id, open_millis / 1000);
        }

        Ok(MemberRemoval {
            member,
            remaining,
            room_deleted,
        })
    }

    async fn member_ids(&self, room_id: &RoomId) -> Result<Vec<ConnectionId>, RepositoryError> {
        self.with_room(room_id, |room| room.member_ids()).await
    }

    async fn append_chat_message(
        &self,
        room_id: &RoomId,
        message: Value,
    ) -> Result<(), RepositoryError> {
        self.with_room(room_id, |room| room.chat_history.push(message))
            .await
    }

    async fn chat_history(&self, room_id: &RoomId) -> Result<Vec<Value>, RepositoryError> {
        self.with_room(room_id, |room| room.chat_history.clone())
            .await
    }

    async fn set_pomodoro(
        &self,
        room_id: &RoomId,
        state: PomodoroState,
    ) -> Result<(), RepositoryError> {
        self.with_room(room_id, |room| room.pomodoro = state).await
    }

    async fn set_whiteboard(
        &self,
        room_id: &RoomId,
        data: Option<Value>,
    ) -> Result<(), RepositoryError> {
        self.with_room(room_id, |room| room.whiteboard = data).await
    }
}
