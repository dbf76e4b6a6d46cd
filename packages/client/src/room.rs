//! Client-side room state.
//!
//! `RoomClient` reacts to server events, prompt commands and the 1 s tick.
//! It never touches the socket; every reaction lists the events to send
//! and the lines to print.

use std::{sync::Arc, time::Instant};

use studyroom_shared::{
    protocol::{
        ChatMessagePayload, ClientEvent, JoinRoomPayload, PomodoroState, ServerEvent,
        SyncPomodoroPayload, WhiteboardDrawPayload,
    },
    time::now_millis,
};

use crate::{
    chat::ChatLog,
    command::{Command, HELP, TimerAction},
    error::CommandError,
    formatter::MessageFormatter,
    media::{LocalStream, MediaSource, MediaTrack},
    mesh::{LocalIdentity, PeerMesh},
    pomodoro::PomodoroTimer,
    whiteboard::Whiteboard,
};

/// What the session should do after an input
#[derive(Debug, Default, PartialEq)]
pub struct Reaction {
    pub outgoing: Vec<ClientEvent>,
    pub notices: Vec<String>,
    /// The user asked to leave; the session ends after sending `outgoing`
    pub leave: bool,
}

impl Reaction {
    fn notice(text: impl Into<String>) -> Self {
        Self {
            notices: vec![text.into()],
            ..Self::default()
        }
    }
}

pub struct RoomClient {
    room_id: String,
    name: String,
    self_id: Option<String>,
    host: Option<String>,
    stream: LocalStream,
    media: Arc<dyn MediaSource>,
    screen: Option<MediaTrack>,
    mesh: PeerMesh,
    chat: ChatLog,
    whiteboard: Whiteboard,
    pomodoro: PomodoroTimer,
}

impl RoomClient {
    /// `stream` must already be acquired; joining without media is not
    /// supported.
    pub fn new(
        room_id: String,
        name: String,
        stream: LocalStream,
        media: Arc<dyn MediaSource>,
        mesh: PeerMesh,
    ) -> Self {
        Self {
            room_id,
            name,
            self_id: None,
            host: None,
            stream,
            media,
            screen: None,
            mesh,
            chat: ChatLog::new(),
            whiteboard: Whiteboard::new(),
            pomodoro: PomodoroTimer::default(),
        }
    }

    /// Use phase lengths other than 25/5 minutes. They should match the
    /// server's, or a switch here disagrees with the room's timer.
    pub fn with_pomodoro(mut self, pomodoro: PomodoroTimer) -> Self {
        self.pomodoro = pomodoro;
        self
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn self_id(&self) -> Option<&str> {
        self.self_id.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn mesh(&self) -> &PeerMesh {
        &self.mesh
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn whiteboard(&self) -> &Whiteboard {
        &self.whiteboard
    }

    pub fn pomodoro(&self) -> PomodoroState {
        self.pomodoro.state()
    }

    pub fn is_sharing_screen(&self) -> bool {
        self.screen.is_some()
    }

    /// Drop everything tied to the previous connection before reconnecting.
    pub fn reset(&mut self) {
        self.mesh.clear();
        self.self_id = None;
        self.host = None;
        self.screen = None;
        self.chat.clear();
        self.whiteboard.clear();
        self.pomodoro.reset();
    }

    fn identity(&self) -> Option<LocalIdentity> {
        self.self_id.as_ref().map(|id| LocalIdentity {
            id: id.clone(),
            name: self.name.clone(),
        })
    }

    fn sync_pomodoro(&self, new_state: PomodoroState) -> ClientEvent {
        ClientEvent::SyncPomodoro(SyncPomodoroPayload {
            room_id: self.room_id.clone(),
            new_state,
        })
    }

    pub fn on_server_event(&mut self, event: ServerEvent, now: Instant) -> Reaction {
        tracing::debug!("Received {}", event.name());

        match event {
            ServerEvent::Connected(payload) => {
                tracing::info!("Assigned connection id {}", payload.id);
                self.self_id = Some(payload.id);
                Reaction {
                    outgoing: vec![
                        ClientEvent::JoinRoom(JoinRoomPayload {
                            room_id: self.room_id.clone(),
                            user_name: self.name.clone(),
                        }),
                        ClientEvent::RequestChatHistory(self.room_id.clone()),
                    ],
                    ..Reaction::default()
                }
            }
            ServerEvent::AllUsers(members) => {
                let Some(me) = self.identity() else {
                    tracing::warn!("Roster arrived before the connection id, ignoring");
                    return Reaction::default();
                };
                let outgoing = self.mesh.on_all_users(&members, &me, &self.stream, now);
                Reaction {
                    outgoing,
                    notices: vec![MessageFormatter::format_room_joined(
                        &self.room_id,
                        &members,
                    )],
                    leave: false,
                }
            }
            ServerEvent::RoomState(payload) => {
                self.host = payload.host;
                if let Err(e) = self.whiteboard.apply_snapshot(payload.whiteboard) {
                    tracing::warn!("Ignoring malformed whiteboard snapshot: {}", e);
                }
                self.chat.replace_history(payload.chat_history);
                self.pomodoro.apply_remote(payload.pomodoro_state);
                Reaction::notice(MessageFormatter::format_room_state(
                    self.host.as_deref(),
                    self.self_id.as_deref(),
                    self.whiteboard.strokes().len(),
                    self.chat.records().len(),
                    &self.pomodoro.state(),
                ))
            }
            ServerEvent::UserJoined(payload) => {
                let caller_id = payload.caller_id.clone();
                let name = payload.name.clone();
                match self.mesh.on_user_joined(payload, &self.stream, now) {
                    Ok(Some(answer)) => Reaction {
                        outgoing: vec![answer],
                        notices: vec![MessageFormatter::format_member_joined(&name, &caller_id)],
                        leave: false,
                    },
                    Ok(None) => Reaction::default(),
                    Err(e) => {
                        tracing::warn!("Handshake with {} failed: {}", caller_id, e);
                        Reaction::notice(MessageFormatter::format_peer_failure(
                            &caller_id,
                            &e.to_string(),
                        ))
                    }
                }
            }
            ServerEvent::ReceivingReturnedSignal(payload) => {
                let id = payload.id.clone();
                match self.mesh.on_returned_signal(payload) {
                    Ok(()) => Reaction::default(),
                    Err(e) => {
                        tracing::warn!("Handshake with {} failed: {}", id, e);
                        Reaction::notice(MessageFormatter::format_peer_failure(
                            &id,
                            &e.to_string(),
                        ))
                    }
                }
            }
            ServerEvent::ReceiveChatMessage(message) => match self.chat.receive(message) {
                Ok(record) => Reaction::notice(MessageFormatter::format_chat_message(
                    record,
                    self.self_id.as_deref(),
                )),
                Err(e) => {
                    tracing::warn!("Dropping malformed chat message: {}", e);
                    Reaction::default()
                }
            },
            ServerEvent::ChatHistory(history) => {
                let count = self.chat.replace_history(history);
                tracing::debug!("Chat history replaced ({} messages)", count);
                Reaction::default()
            }
            ServerEvent::SyncPomodoro(state) => {
                self.pomodoro.apply_remote(state);
                Reaction::notice(MessageFormatter::format_timer_synced(&state))
            }
            ServerEvent::WhiteboardDraw(data) => match self.whiteboard.apply_update(data) {
                Ok(strokes) => Reaction::notice(MessageFormatter::format_whiteboard(strokes)),
                Err(e) => {
                    tracing::warn!("Dropping malformed whiteboard update: {}", e);
                    Reaction::default()
                }
            },
            ServerEvent::ClearWhiteboard => {
                self.whiteboard.clear();
                Reaction::notice(MessageFormatter::format_whiteboard_cleared())
            }
            ServerEvent::UserLeft(payload) => {
                let name = self.mesh.on_user_left(&payload.id);
                Reaction::notice(MessageFormatter::format_member_left(
                    name.as_deref(),
                    &payload.id,
                ))
            }
        }
    }

    pub fn on_command(&mut self, command: Command) -> Result<Reaction, CommandError> {
        match command {
            Command::Help => Ok(Reaction::notice(HELP)),
            Command::Peers => Ok(Reaction::notice(MessageFormatter::format_peers(
                &self.mesh.peers(),
            ))),
            Command::History => Ok(Reaction::notice(MessageFormatter::format_history(
                self.chat.records(),
                self.self_id.as_deref(),
            ))),
            Command::Timer(TimerAction::Status) => Ok(Reaction::notice(
                MessageFormatter::format_pomodoro(&self.pomodoro.state()),
            )),
            Command::Share => self.start_screen_share(),
            Command::Unshare => self.stop_screen_share(),
            Command::Leave => Ok(Reaction {
                outgoing: vec![ClientEvent::LeaveRoom],
                leave: true,
                ..Reaction::default()
            }),
            command => {
                let sender_id = self.self_id.clone().ok_or(CommandError::NotJoined)?;
                Ok(self.on_room_command(command, &sender_id))
            }
        }
    }

    fn on_room_command(&mut self, command: Command, sender_id: &str) -> Reaction {
        match command {
            Command::Chat(text) => {
                let record = ChatLog::compose(sender_id, &self.name, &text, now_millis());
                let message = match serde_json::to_value(&record) {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::error!("Failed to serialize chat message: {}", e);
                        return Reaction::default();
                    }
                };
                let notice = MessageFormatter::format_chat_message(&record, Some(sender_id));
                self.chat.push_local(record);
                Reaction {
                    outgoing: vec![ClientEvent::SendChatMessage(ChatMessagePayload {
                        room_id: self.room_id.clone(),
                        message,
                    })],
                    notices: vec![notice],
                    leave: false,
                }
            }
            Command::Draw(stroke) => {
                let data = self.whiteboard.draw(stroke);
                Reaction {
                    outgoing: vec![ClientEvent::WhiteboardDraw(WhiteboardDrawPayload {
                        room_id: self.room_id.clone(),
                        data,
                    })],
                    notices: vec![MessageFormatter::format_whiteboard(
                        self.whiteboard.strokes().len(),
                    )],
                    leave: false,
                }
            }
            Command::Clear => {
                self.whiteboard.clear();
                Reaction {
                    outgoing: vec![ClientEvent::ClearWhiteboard(self.room_id.clone())],
                    notices: vec![MessageFormatter::format_whiteboard_cleared()],
                    leave: false,
                }
            }
            Command::Timer(action) => {
                let running = self.pomodoro.state().is_running;
                let new_state = match action {
                    TimerAction::Start if !running => self.pomodoro.toggle(),
                    TimerAction::Pause if running => self.pomodoro.toggle(),
                    TimerAction::Switch => self.pomodoro.switch_mode(false),
                    _ => {
                        return Reaction::notice(MessageFormatter::format_pomodoro(
                            &self.pomodoro.state(),
                        ));
                    }
                };
                Reaction {
                    outgoing: vec![self.sync_pomodoro(new_state)],
                    notices: vec![MessageFormatter::format_timer_synced(&new_state)],
                    leave: false,
                }
            }
            other => {
                tracing::debug!("Command {:?} needs no room state", other);
                Reaction::default()
            }
        }
    }

    fn start_screen_share(&mut self) -> Result<Reaction, CommandError> {
        if self.screen.is_some() {
            return Err(CommandError::ShareState("already on"));
        }
        let track = self.media.display_media()?;
        let replaced = self.mesh.replace_video_track(&track);
        tracing::info!("Screen sharing started on {} peers", replaced);
        self.screen = Some(track);
        Ok(Reaction::notice(MessageFormatter::format_screen_share(
            true, replaced,
        )))
    }

    fn stop_screen_share(&mut self) -> Result<Reaction, CommandError> {
        if self.screen.take().is_none() {
            return Err(CommandError::ShareState("not active"));
        }
        let replaced = self.mesh.replace_video_track(&self.stream.video);
        tracing::info!("Screen sharing stopped on {} peers", replaced);
        Ok(Reaction::notice(MessageFormatter::format_screen_share(
            false, replaced,
        )))
    }

    /// Advance the timer and expire stale handshakes.
    pub fn on_tick(&mut self, now: Instant) -> Reaction {
        let mut reaction = Reaction::default();

        if self.self_id.is_some()
            && let Some(state) = self.pomodoro.tick()
        {
            reaction.outgoing.push(self.sync_pomodoro(state));
            reaction
                .notices
                .push(MessageFormatter::format_timer_synced(&state));
        }

        for peer in self.mesh.sweep_expired(now) {
            reaction
                .notices
                .push(MessageFormatter::format_handshake_timeout(&peer));
        }

        reaction
    }
}
