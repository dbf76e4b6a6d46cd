//! Room Coordinator
//!
//! Entry point for every signaling event. Each handler holds the event gate
//! from start to finish, so handlers never interleave across connections
//! and a join snapshot can never observe a half-applied event.

use std::{fmt, sync::Arc};

use studyroom_shared::protocol::{
    ChatMessagePayload, ClientEvent, JoinRoomPayload, ReturningSignalPayload,
    SendingSignalPayload, SyncPomodoroPayload, WhiteboardDrawPayload,
};
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, DisplayName, MessagePushError, MessagePusher, PomodoroPolicy, PusherChannel,
    RoomId, RoomRepository,
};

use super::{
    ChatUseCase, ConnectParticipantUseCase, DisconnectParticipantUseCase, JoinRoomError,
    JoinRoomUseCase, RelayError, RelaySignalUseCase, RoomEventError, SyncPomodoroUseCase,
    WhiteboardUseCase,
};

/// Per-connection state owned by the connection's reader task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: ConnectionId,
    /// Room this connection joined, if any
    pub room: Option<RoomId>,
    pub name: Option<DisplayName>,
}

impl Session {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            room: None,
            name: None,
        }
    }
}

pub struct RoomCoordinator {
    gate: Mutex<()>,
    connect: ConnectParticipantUseCase,
    join: JoinRoomUseCase,
    relay: RelaySignalUseCase,
    chat: ChatUseCase,
    pomodoro: SyncPomodoroUseCase,
    whiteboard: WhiteboardUseCase,
    disconnect: DisconnectParticipantUseCase,
}

impl RoomCoordinator {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        policy: PomodoroPolicy,
    ) -> Self {
        Self {
            gate: Mutex::new(()),
            connect: ConnectParticipantUseCase::new(message_pusher.clone()),
            join: JoinRoomUseCase::new(repository.clone(), message_pusher.clone()),
            relay: RelaySignalUseCase::new(message_pusher.clone()),
            chat: ChatUseCase::new(repository.clone(), message_pusher.clone()),
            pomodoro: SyncPomodoroUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                policy,
            ),
            whiteboard: WhiteboardUseCase::new(repository.clone(), message_pusher.clone()),
            disconnect: DisconnectParticipantUseCase::new(repository, message_pusher),
        }
    }

    /// Register a new connection and announce its id to it.
    pub async fn connect(&self, sender: PusherChannel) -> Result<Session, MessagePushError> {
        let _turn = self.gate.lock().await;
        let id = self.connect.execute(sender).await?;
        tracing::info!("Connection {} opened", id);
        Ok(Session::new(id))
    }

    /// Dispatch one decoded event. Failures are logged, never propagated.
    pub async fn handle(&self, session: &mut Session, event: ClientEvent) {
        let name = event.name();
        tracing::debug!("{} <- {}", name, session.id);

        match event {
            ClientEvent::JoinRoom(payload) => {
                let result = self.join_room(session, payload).await;
                report(name, &session.id, result);
            }
            ClientEvent::SendingSignal(payload) => {
                report(name, &session.id, self.sending_signal(session, payload).await);
            }
            ClientEvent::ReturningSignal(payload) => {
                report(name, &session.id, self.returning_signal(session, payload).await);
            }
            ClientEvent::SendChatMessage(payload) => {
                report(name, &session.id, self.send_chat_message(session, payload).await);
            }
            ClientEvent::RequestChatHistory(room_id) => {
                report(name, &session.id, self.request_chat_history(session, room_id).await);
            }
            ClientEvent::SyncPomodoro(payload) => {
                report(name, &session.id, self.sync_pomodoro(session, payload).await);
            }
            ClientEvent::WhiteboardDraw(payload) => {
                report(name, &session.id, self.whiteboard_draw(session, payload).await);
            }
            ClientEvent::ClearWhiteboard(room_id) => {
                report(name, &session.id, self.clear_whiteboard(session, room_id).await);
            }
            ClientEvent::LeaveRoom => {
                let result = self.leave_room(session).await;
                report(name, &session.id, result);
            }
        }
    }

    /// `join-room`. A connection may be in at most one room at a time.
    pub async fn join_room(
        &self,
        session: &mut Session,
        payload: JoinRoomPayload,
    ) -> Result<(), JoinRoomError> {
        let _turn = self.gate.lock().await;
        if let Some(room) = &session.room {
            return Err(JoinRoomError::AlreadyJoined(
                session.id.as_str().to_string(),
                room.as_str().to_string(),
            ));
        }

        let (room_id, name, _) = self.join.execute(&session.id, payload).await?;
        session.room = Some(room_id);
        session.name = Some(name);
        Ok(())
    }

    pub async fn sending_signal(
        &self,
        session: &Session,
        payload: SendingSignalPayload,
    ) -> Result<(), RelayError> {
        let _turn = self.gate.lock().await;
        self.relay.send_offer(&session.id, payload).await.map(drop)
    }

    pub async fn returning_signal(
        &self,
        session: &Session,
        payload: ReturningSignalPayload,
    ) -> Result<(), RelayError> {
        let _turn = self.gate.lock().await;
        self.relay.send_answer(&session.id, payload).await.map(drop)
    }

    pub async fn send_chat_message(
        &self,
        session: &Session,
        payload: ChatMessagePayload,
    ) -> Result<(), RoomEventError> {
        let _turn = self.gate.lock().await;
        self.chat.send(&session.id, payload).await.map(drop)
    }

    pub async fn request_chat_history(
        &self,
        session: &Session,
        room_id: String,
    ) -> Result<(), RoomEventError> {
        let _turn = self.gate.lock().await;
        self.chat.history(&session.id, room_id).await.map(drop)
    }

    pub async fn sync_pomodoro(
        &self,
        session: &Session,
        payload: SyncPomodoroPayload,
    ) -> Result<(), RoomEventError> {
        let _turn = self.gate.lock().await;
        self.pomodoro.execute(&session.id, payload).await.map(drop)
    }

    pub async fn whiteboard_draw(
        &self,
        session: &Session,
        payload: WhiteboardDrawPayload,
    ) -> Result<(), RoomEventError> {
        let _turn = self.gate.lock().await;
        self.whiteboard.draw(&session.id, payload).await.map(drop)
    }

    pub async fn clear_whiteboard(
        &self,
        session: &Session,
        room_id: String,
    ) -> Result<(), RoomEventError> {
        let _turn = self.gate.lock().await;
        self.whiteboard.clear(&session.id, room_id).await.map(drop)
    }

    /// `leave-room`: same cleanup as a disconnect, but the connection stays
    /// open and may join again.
    pub async fn leave_room(&self, session: &mut Session) -> Result<(), RoomEventError> {
        let _turn = self.gate.lock().await;
        let Some(room_id) = session.room.take() else {
            tracing::debug!("{} sent leave-room without joining", session.id);
            return Ok(());
        };
        session.name = None;
        self.disconnect.leave(&session.id, &room_id).await.map(drop)
    }

    /// Socket closed: leave the joined room (if any) and forget the connection.
    pub async fn disconnect(&self, session: Session) {
        let _turn = self.gate.lock().await;
        let result = self
            .disconnect
            .disconnect(&session.id, session.room.as_ref())
            .await;
        report("disconnect", &session.id, result.map(drop));
        tracing::info!("Connection {} closed", session.id);
    }
}

/// Expected rejections (unknown room, target already gone) are routine and
/// logged at debug; everything else is a warning.
trait Rejection: fmt::Display {
    fn is_routine(&self) -> bool;
}

impl Rejection for JoinRoomError {
    fn is_routine(&self) -> bool {
        false
    }
}

impl Rejection for RelayError {
    fn is_routine(&self) -> bool {
        matches!(self, Self::TargetNotFound(_))
    }
}

impl Rejection for RoomEventError {
    fn is_routine(&self) -> bool {
        matches!(self, Self::RoomNotFound(_))
    }
}

fn report<E: Rejection>(event: &str, connection: &ConnectionId, result: Result<(), E>) {
    match result {
        Ok(()) => {}
        Err(e) if e.is_routine() => {
            tracing::debug!("{} from {} ignored: {}", event, connection, e);
        }
        Err(e) => {
            tracing::warn!("{} from {} dropped: {}", event, connection, e);
        }
    }
}
