//! WebSocket `MessagePusher`.
//!
//! Holds one `UnboundedSender` per live connection. The matching receiver is
//! drained by the connection's pusher loop (`ui::handler::websocket`), which
//! writes frames to the socket in FIFO order.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// Key: connection id
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered connections
    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, client_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", client_id);
        clients.insert(client_id, sender);
    }

    async fn unregister_client(&self, client_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(client_id).is_some() {
            tracing::debug!("Connection '{}' unregistered from MessagePusher", client_id);
        }
    }

    async fn push_to(
        &self,
        client_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let sender = clients
            .get(client_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(client_id.as_str().to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::trace!("Pushed frame to '{}'", client_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(&target) {
                // a half-closed connection must not stop delivery to the rest
                Some(sender) => {
                    if let Err(e) = sender.send(content.to_string()) {
                        tracing::warn!("Failed to push frame to '{}': {}", target, e);
                    }
                }
                None => {
                    tracing::warn!("Connection '{}' not found during broadcast, skipping", target);
                }
            }
        }

        Ok(())
    }
}
