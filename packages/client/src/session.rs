//! One WebSocket connection to the signaling server.

use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use studyroom_shared::protocol::{ClientEvent, ServerEvent};
use tokio::{
    net::TcpStream,
    sync::mpsc,
    time::MissedTickBehavior,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use crate::{
    command::Command,
    error::ClientError,
    room::{Reaction, RoomClient},
    ui::{print_notices, redisplay_prompt},
};

type Writer = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

async fn send_event(write: &mut Writer, event: &ClientEvent) -> Result<(), ClientError> {
    let json = event
        .to_json()
        .map_err(|e| ClientError::ConnectionError(format!("Failed to serialize: {}", e)))?;
    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))
}

/// Run the WebSocket client session
///
/// Returns `Ok(())` when the user left (`/leave`, Ctrl+C or EOF) and an
/// error when the connection was lost.
pub async fn run_client_session(
    url: &str,
    room: &mut RoomClient,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to signaling server!");
    println!(
        "\nYou are '{}' in room '{}'. Type /help for commands. Press Ctrl+C to leave.\n",
        room.name(),
        room.room_id()
    );

    let (mut write, mut read) = ws_stream.split();

    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        let reaction = tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => match text.as_str().parse::<ServerEvent>() {
                    Ok(event) => room.on_server_event(event, Instant::now()),
                    Err(e) => {
                        tracing::warn!("Malformed frame from server dropped: {}", e);
                        continue;
                    }
                },
                Some(Ok(Message::Binary(data))) => {
                    tracing::warn!("Unexpected {} bytes of binary data dropped", data.len());
                    continue;
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Server closed the connection");
                    return Err(ClientError::ConnectionError("Connection lost".to_string()));
                }
                // pings are answered by tungstenite
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return Err(ClientError::ConnectionError(e.to_string()));
                }
            },
            line = input_rx.recv() => match line {
                Some(line) => match line.parse::<Command>().and_then(|c| room.on_command(c)) {
                    Ok(reaction) => reaction,
                    Err(e) => {
                        println!("! {}", e);
                        redisplay_prompt(room.name());
                        continue;
                    }
                },
                None => {
                    // Ctrl+C / Ctrl+D at the prompt
                    Reaction {
                        outgoing: vec![ClientEvent::LeaveRoom],
                        notices: Vec::new(),
                        leave: true,
                    }
                }
            },
            _ = ticker.tick() => room.on_tick(Instant::now()),
        };

        for event in &reaction.outgoing {
            if let Err(e) = send_event(&mut write, event).await {
                tracing::warn!("Failed to send {}: {}", event.name(), e);
                return Err(e);
            }
        }
        print_notices(&reaction.notices, room.name());

        if reaction.leave {
            tracing::info!("Left room {}", room.room_id());
            write.send(Message::Close(None)).await.ok();
            return Ok(());
        }
    }
}
