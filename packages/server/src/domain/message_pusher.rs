//! Outbound delivery interface.
//!
//! Use cases hand serialized frames to a `MessagePusher`; the concrete
//! transport (WebSocket today) lives in the infrastructure layer.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// Per-connection outbound FIFO. One frame per entry.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Start delivering frames for a connection.
    async fn register_client(&self, client_id: ConnectionId, sender: PusherChannel);

    /// Stop delivering frames for a connection. No-op if unknown.
    async fn unregister_client(&self, client_id: &ConnectionId);

    /// Deliver to exactly one connection.
    async fn push_to(&self, client_id: &ConnectionId, content: &str)
    -> Result<(), MessagePushError>;

    /// Deliver to every target; individual failures are logged, not returned.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
