//! Client execution logic with reconnection support.

use std::sync::Arc;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    config::ClientConfig,
    domain::ReconnectPolicy,
    error::ClientError,
    media::MediaSource,
    mesh::PeerMesh,
    peer::PeerFactory,
    room::RoomClient,
    session::run_client_session,
};

/// Read prompt lines on a blocking thread. The thread outlives individual
/// sessions so a reconnect does not start a second reader on stdin.
fn spawn_readline(name: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", name);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

/// Acquire media, then join the room and keep the session alive across
/// dropped connections.
pub async fn run_client(
    config: ClientConfig,
    media: Arc<dyn MediaSource>,
    factory: Arc<dyn PeerFactory>,
) -> Result<(), ClientError> {
    // no degraded mode: without camera and microphone we never join
    let stream = media.user_media().map_err(|e| {
        tracing::error!("Cannot join without camera and microphone: {}", e);
        ClientError::from(e)
    })?;

    let room_id = config.room_id();
    println!("Room id: {} (share it so others can join)", room_id);

    let mesh = PeerMesh::new(factory, config.handshake_timeout());
    let mut room = RoomClient::new(room_id, config.name.clone(), stream, media, mesh)
        .with_pomodoro(config.pomodoro_timer());
    let mut input_rx = spawn_readline(config.name.clone());
    let policy = ReconnectPolicy::default();
    let mut failed_attempts = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            config.url,
            config.name,
            failed_attempts + 1,
            policy.max_attempts
        );

        match run_client_session(&config.url, &mut room, &mut input_rx).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                break;
            }
            Err(e) => {
                tracing::warn!("Connection lost: {}", e);
                room.reset();
                failed_attempts += 1;

                let Some(delay) = policy.next_delay(&e, failed_attempts) else {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        failed_attempts
                    );
                    return Err(e);
                };

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    delay.as_secs(),
                    failed_attempts + 1,
                    policy.max_attempts
                );

                tokio::time::sleep(delay).await;
            }
        }
    }

    Ok(())
}
