//! Full-mesh peer bootstrap.
//!
//! A joiner initiates one handshake per existing member. Existing members
//! learn about the joiner only when its offer arrives as `user-joined`.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use studyroom_shared::protocol::{
    ClientEvent, MemberInfo, ReturnedSignalPayload, ReturningSignalPayload, SendingSignalPayload,
    UserJoinedPayload,
};

use crate::{
    error::PeerError,
    media::{LocalStream, MediaTrack},
    peer::{PeerEndpoint, PeerFactory, PeerRole},
};

/// Default time a pending handshake may take before the peer is dropped
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

struct TrackedPeer {
    remote_id: String,
    name: String,
    role: PeerRole,
    endpoint: Box<dyn PeerEndpoint>,
    deadline: Instant,
}

/// Peer as listed by `/peers`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSummary {
    pub id: String,
    pub name: String,
    pub role: PeerRole,
    pub connected: bool,
}

/// Who we are in the room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    pub id: String,
    pub name: String,
}

pub struct PeerMesh {
    factory: Arc<dyn PeerFactory>,
    handshake_timeout: Duration,
    // insertion order is kept for display
    peers: Vec<TrackedPeer>,
}

impl PeerMesh {
    pub fn new(factory: Arc<dyn PeerFactory>, handshake_timeout: Duration) -> Self {
        Self {
            factory,
            handshake_timeout,
            peers: Vec::new(),
        }
    }

    fn position(&self, remote_id: &str) -> Option<usize> {
        self.peers.iter().position(|p| p.remote_id == remote_id)
    }

    fn track(
        &mut self,
        role: PeerRole,
        remote_id: &str,
        name: &str,
        stream: &LocalStream,
        now: Instant,
    ) -> &mut TrackedPeer {
        let endpoint = self.factory.create(role, remote_id, stream);
        self.peers.push(TrackedPeer {
            remote_id: remote_id.to_string(),
            name: name.to_string(),
            role,
            endpoint,
            deadline: now + self.handshake_timeout,
        });
        let last = self.peers.len() - 1;
        &mut self.peers[last]
    }

    fn drop_peer(&mut self, index: usize) -> TrackedPeer {
        let mut peer = self.peers.remove(index);
        peer.endpoint.destroy();
        peer
    }

    /// Start one handshake per existing member. Returns the offers to send.
    pub fn on_all_users(
        &mut self,
        members: &[MemberInfo],
        me: &LocalIdentity,
        stream: &LocalStream,
        now: Instant,
    ) -> Vec<ClientEvent> {
        let mut outgoing = Vec::with_capacity(members.len());

        for member in members {
            if member.id == me.id || self.position(&member.id).is_some() {
                continue;
            }
            let peer = self.track(PeerRole::Initiator, &member.id, &member.name, stream, now);
            match peer.endpoint.take_local_signal() {
                Some(signal) => outgoing.push(ClientEvent::SendingSignal(SendingSignalPayload {
                    user_to_signal: member.id.clone(),
                    caller_id: me.id.clone(),
                    signal,
                    name: me.name.clone(),
                })),
                None => tracing::warn!("Initiator peer for {} produced no offer", member.id),
            }
        }

        outgoing
    }

    /// Answer an offer from a new member.
    ///
    /// Returns `Ok(None)` when a peer for the caller is already tracked.
    /// On a failed handshake the peer is dropped and the error returned.
    pub fn on_user_joined(
        &mut self,
        payload: UserJoinedPayload,
        stream: &LocalStream,
        now: Instant,
    ) -> Result<Option<ClientEvent>, PeerError> {
        if self.position(&payload.caller_id).is_some() {
            tracing::debug!("Duplicate offer from {} ignored", payload.caller_id);
            return Ok(None);
        }

        let peer = self.track(
            PeerRole::Receiver,
            &payload.caller_id,
            &payload.name,
            stream,
            now,
        );
        let answer = peer
            .endpoint
            .signal(payload.signal)
            .map(|_| peer.endpoint.take_local_signal());

        match answer {
            Ok(Some(signal)) => Ok(Some(ClientEvent::ReturningSignal(ReturningSignalPayload {
                caller_id: payload.caller_id,
                signal,
            }))),
            Ok(None) => {
                // a receiver with nothing to answer is unusable
                let index = self.peers.len() - 1;
                self.drop_peer(index);
                Err(PeerError::InvalidSignal("no answer produced".to_string()))
            }
            Err(e) => {
                let index = self.peers.len() - 1;
                self.drop_peer(index);
                Err(e)
            }
        }
    }

    /// Complete a handshake this client initiated.
    pub fn on_returned_signal(&mut self, payload: ReturnedSignalPayload) -> Result<(), PeerError> {
        let Some(index) = self.position(&payload.id) else {
            tracing::debug!("Answer from untracked peer {} ignored", payload.id);
            return Ok(());
        };

        if let Err(e) = self.peers[index].endpoint.signal(payload.signal) {
            self.drop_peer(index);
            return Err(e);
        }
        Ok(())
    }

    /// Destroy the peer for a member who left. Returns its display name.
    pub fn on_user_left(&mut self, remote_id: &str) -> Option<String> {
        let index = self.position(remote_id)?;
        Some(self.drop_peer(index).name)
    }

    /// Swap the outbound video track on every peer. Returns how many
    /// peers now send the new track.
    pub fn replace_video_track(&mut self, track: &MediaTrack) -> usize {
        let mut replaced = 0;
        for peer in &mut self.peers {
            match peer.endpoint.replace_video_track(track) {
                Ok(()) => replaced += 1,
                Err(e) => tracing::warn!(
                    "Could not replace video track for {}: {}",
                    peer.remote_id,
                    e
                ),
            }
        }
        replaced
    }

    /// Drop pending peers whose handshake deadline has passed.
    pub fn sweep_expired(&mut self, now: Instant) -> Vec<PeerSummary> {
        let mut expired = Vec::new();
        let mut index = 0;
        while index < self.peers.len() {
            let peer = &self.peers[index];
            if !peer.endpoint.is_connected() && now >= peer.deadline {
                tracing::warn!(
                    "Handshake with {} timed out after {:?}, dropping peer",
                    peer.remote_id,
                    self.handshake_timeout
                );
                let peer = self.drop_peer(index);
                expired.push(PeerSummary {
                    id: peer.remote_id,
                    name: peer.name,
                    role: peer.role,
                    connected: false,
                });
            } else {
                index += 1;
            }
        }
        expired
    }

    pub fn peers(&self) -> Vec<PeerSummary> {
        self.peers
            .iter()
            .map(|p| PeerSummary {
                id: p.remote_id.clone(),
                name: p.name.clone(),
                role: p.role,
                connected: p.endpoint.is_connected(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Destroy every peer (leaving the room or reconnecting).
    pub fn clear(&mut self) {
        for peer in &mut self.peers {
            peer.endpoint.destroy();
        }
        self.peers.clear();
    }
}
