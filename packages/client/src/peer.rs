//! Peer connection endpoints.
//!
//! `PeerMesh` only talks to `PeerEndpoint`; the endpoint decides what a
//! signal document contains. `SignalOnlyPeer` exchanges opaque
//! offer/answer documents without opening a media transport, which is
//! enough to drive the mesh bootstrap from a terminal.

use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::PeerError,
    media::{LocalStream, MediaTrack},
};

/// Which side of the handshake this endpoint plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRole {
    /// Created for each existing member on join; produces the offer
    Initiator,
    /// Created when an offer arrives; produces the answer
    Receiver,
}

pub trait PeerEndpoint: Send {
    /// Signal ready to be sent to the remote side, if any.
    fn take_local_signal(&mut self) -> Option<Value>;

    /// Feed a signal received from the remote side.
    fn signal(&mut self, remote: Value) -> Result<(), PeerError>;

    /// Swap the outbound video track in place, without renegotiation.
    fn replace_video_track(&mut self, track: &MediaTrack) -> Result<(), PeerError>;

    fn is_connected(&self) -> bool;

    /// Tear the connection down. Idempotent.
    fn destroy(&mut self);
}

pub trait PeerFactory: Send + Sync {
    fn create(&self, role: PeerRole, remote_id: &str, stream: &LocalStream)
    -> Box<dyn PeerEndpoint>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandshakeState {
    AwaitingOffer,
    AwaitingAnswer,
    Connected,
    Closed,
}

impl HandshakeState {
    fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingOffer => "awaiting offer",
            Self::AwaitingAnswer => "awaiting answer",
            Self::Connected => "connected",
            Self::Closed => "closed",
        }
    }
}

pub struct SignalOnlyPeer {
    session: String,
    state: HandshakeState,
    outbound: Option<Value>,
    video_track: MediaTrack,
    audio_track: MediaTrack,
}

impl SignalOnlyPeer {
    pub fn new(role: PeerRole, stream: &LocalStream) -> Self {
        let mut peer = Self {
            session: Uuid::new_v4().simple().to_string(),
            state: HandshakeState::AwaitingOffer,
            outbound: None,
            video_track: stream.video.clone(),
            audio_track: stream.audio.clone(),
        };
        if role == PeerRole::Initiator {
            peer.outbound = Some(peer.description("offer"));
            peer.state = HandshakeState::AwaitingAnswer;
        }
        peer
    }

    fn description(&self, kind: &str) -> Value {
        json!({
            "type": kind,
            "sdp": self.session,
            "tracks": [self.audio_track.id, self.video_track.id],
        })
    }

    /// Id of the video track currently sent to this peer
    pub fn video_track_id(&self) -> &str {
        &self.video_track.id
    }
}

impl PeerEndpoint for SignalOnlyPeer {
    fn take_local_signal(&mut self) -> Option<Value> {
        self.outbound.take()
    }

    fn signal(&mut self, remote: Value) -> Result<(), PeerError> {
        let kind = remote
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| PeerError::InvalidSignal(remote.to_string()))?;

        match (self.state, kind) {
            (HandshakeState::Closed, _) => Err(PeerError::Closed),
            (HandshakeState::AwaitingOffer, "offer") => {
                self.outbound = Some(self.description("answer"));
                self.state = HandshakeState::Connected;
                Ok(())
            }
            (HandshakeState::AwaitingAnswer, "answer") => {
                self.state = HandshakeState::Connected;
                Ok(())
            }
            (state, other) => Err(PeerError::UnexpectedSignal {
                signal: other.to_string(),
                state: state.as_str(),
            }),
        }
    }

    fn replace_video_track(&mut self, track: &MediaTrack) -> Result<(), PeerError> {
        if self.state == HandshakeState::Closed {
            return Err(PeerError::Closed);
        }
        self.video_track = track.clone();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state == HandshakeState::Connected
    }

    fn destroy(&mut self) {
        self.state = HandshakeState::Closed;
        self.outbound = None;
    }
}

/// Factory for `SignalOnlyPeer`
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalOnlyPeerFactory;

impl PeerFactory for SignalOnlyPeerFactory {
    fn create(
        &self,
        role: PeerRole,
        remote_id: &str,
        stream: &LocalStream,
    ) -> Box<dyn PeerEndpoint> {
        tracing::debug!("Creating {:?} peer for {}", role, remote_id);
        Box::new(SignalOnlyPeer::new(role, stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaSource, SyntheticMedia, TrackKind};

    fn stream() -> LocalStream {
        SyntheticMedia::default().user_media().unwrap()
    }

    #[test]
    fn test_initiator_and_receiver_handshake() {
        // テスト項目: オファー → アンサーの交換で双方が接続状態になる
        // given (前提条件):
        let mut initiator = SignalOnlyPeer::new(PeerRole::Initiator, &stream());
        let mut receiver = SignalOnlyPeer::new(PeerRole::Receiver, &stream());

        // when (操作):
        let offer = initiator.take_local_signal().unwrap();
        receiver.signal(offer).unwrap();
        let answer = receiver.take_local_signal().unwrap();
        initiator.signal(answer.clone()).unwrap();

        // then (期待する結果):
        assert_eq!(answer["type"], "answer");
        assert!(initiator.is_connected());
        assert!(receiver.is_connected());
        assert!(initiator.take_local_signal().is_none());
    }

    #[test]
    fn test_receiver_has_no_signal_until_offer() {
        // テスト項目: 受信側はオファーを受け取るまで何も送らない
        // given (前提条件):
        let mut receiver = SignalOnlyPeer::new(PeerRole::Receiver, &stream());

        // when (操作):
        let signal = receiver.take_local_signal();

        // then (期待する結果):
        assert!(signal.is_none());
        assert!(!receiver.is_connected());
    }

    #[test]
    fn test_initiator_rejects_offer() {
        // テスト項目: 発信側にオファーが届いた場合はエラーになる
        // given (前提条件):
        let mut initiator = SignalOnlyPeer::new(PeerRole::Initiator, &stream());

        // when (操作):
        let result = initiator.signal(json!({"type": "offer", "sdp": "x"}));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(PeerError::UnexpectedSignal {
                signal: "offer".to_string(),
                state: "awaiting answer",
            })
        );
    }

    #[test]
    fn test_malformed_signal() {
        // テスト項目: type を持たないシグナルは不正として扱われる
        // given (前提条件):
        let mut receiver = SignalOnlyPeer::new(PeerRole::Receiver, &stream());

        // when (操作):
        let result = receiver.signal(json!("S1"));

        // then (期待する結果):
        assert!(matches!(result, Err(PeerError::InvalidSignal(_))));
    }

    #[test]
    fn test_replace_video_track_after_destroy() {
        // テスト項目: 破棄後のトラック差し替えは Closed になり、破棄前は成功する
        // given (前提条件):
        let mut peer = SignalOnlyPeer::new(PeerRole::Initiator, &stream());
        let screen = MediaTrack::new(TrackKind::Video, "screen");

        // when (操作):
        let before = peer.replace_video_track(&screen);
        let replaced_id = peer.video_track_id().to_string();
        peer.destroy();
        let after = peer.replace_video_track(&screen);

        // then (期待する結果):
        assert!(before.is_ok());
        assert_eq!(replaced_id, screen.id);
        assert_eq!(after, Err(PeerError::Closed));
    }
}
