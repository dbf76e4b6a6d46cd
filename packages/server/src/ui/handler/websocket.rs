//! WebSocket connection handlers.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header::ORIGIN},
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use studyroom_shared::protocol::ClientEvent;
use tokio::sync::mpsc;

use crate::{
    domain::ConnectionId,
    ui::state::AppState,
    usecase::{RoomCoordinator, Session},
};

/// Upgrade to WebSocket after checking the browser origin.
///
/// Requests without an `Origin` header (non-browser clients) are accepted.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, StatusCode> {
    if let Some(origin) = headers.get(ORIGIN)
        && origin.as_bytes() != state.allowed_origin.as_bytes()
    {
        tracing::warn!(
            "Rejected WebSocket upgrade from origin {:?} (allowed: {})",
            origin,
            state.allowed_origin
        );
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state)))
}

/// Spawns a task that drains the connection's outbound channel into the
/// WebSocket sink and keeps the connection alive with pings.
///
/// The task ends when the channel closes, the socket write fails, or the
/// previous ping was not answered by the time the next one is due.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    alive: Arc<AtomicBool>,
    heartbeat_interval: Duration,
    connection_id: ConnectionId,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(heartbeat_interval);
        // the first tick completes immediately
        heartbeat.tick().await;

        loop {
            tokio::select! {
                frame = rx.recv() => {
                    let Some(frame) = frame else { break };
                    if sender.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if !alive.swap(false, Ordering::Relaxed) {
                        tracing::info!("Connection {} missed heartbeat, closing", connection_id);
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (tx, rx) = mpsc::unbounded_channel();

    // Use RoomCoordinator to register the connection
    // (the `connected` frame waits in the channel until the pusher starts)
    let mut session = match state.coordinator.connect(tx).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to register connection: {}", e);
            return;
        }
    };

    let (sender, mut receiver) = socket.split();
    let alive = Arc::new(AtomicBool::new(true));
    let mut send_task = pusher_loop(
        rx,
        sender,
        alive.clone(),
        state.heartbeat_interval,
        session.id.clone(),
    );

    loop {
        tokio::select! {
            frame = receiver.next() => {
                let Some(Ok(msg)) = frame else { break };
                if !on_frame(&state.coordinator, &mut session, &alive, msg).await {
                    break;
                }
            }
            _ = &mut send_task => break,
        }
    }
    send_task.abort();

    // Leave the joined room and unregister from the MessagePusher
    state.coordinator.disconnect(session).await;
}

/// Handle one inbound frame. Returns `false` once the peer asked to close.
async fn on_frame(
    coordinator: &RoomCoordinator,
    session: &mut Session,
    alive: &AtomicBool,
    msg: Message,
) -> bool {
    match msg {
        Message::Text(text) => match text.as_str().parse::<ClientEvent>() {
            Ok(event) => coordinator.handle(session, event).await,
            Err(e) => {
                tracing::warn!("Malformed frame from {} dropped: {}", session.id, e);
            }
        },
        Message::Pong(_) => {
            alive.store(true, Ordering::Relaxed);
        }
        Message::Ping(_) => {
            // axum answers pings automatically
            tracing::trace!("Received ping from {}", session.id);
        }
        Message::Binary(_) => {
            tracing::warn!("Binary frame from {} dropped", session.id);
        }
        Message::Close(_) => {
            tracing::info!("Connection {} requested close", session.id);
            return false;
        }
    }
    true
}
