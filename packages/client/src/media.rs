//! Local media.
//!
//! The CLI has no camera; `SyntheticMedia` hands out labelled placeholder
//! tracks so the peer mesh can exercise track replacement. A real capture
//! stack plugs in behind `MediaSource`.

use uuid::Uuid;

use crate::error::MediaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrack {
    pub id: String,
    pub kind: TrackKind,
    pub label: String,
}

impl MediaTrack {
    pub fn new(kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            kind,
            label: label.into(),
        }
    }
}

/// Camera + microphone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStream {
    pub audio: MediaTrack,
    pub video: MediaTrack,
}

pub trait MediaSource: Send + Sync {
    /// Camera and microphone. Failure blocks joining.
    fn user_media(&self) -> Result<LocalStream, MediaError>;

    /// Screen capture track used for screen sharing.
    fn display_media(&self) -> Result<MediaTrack, MediaError>;
}

/// Placeholder tracks; `deny` simulates a refused permission prompt.
#[derive(Debug, Clone, Default)]
pub struct SyntheticMedia {
    deny: bool,
}

impl SyntheticMedia {
    pub fn new(deny: bool) -> Self {
        Self { deny }
    }
}

impl MediaSource for SyntheticMedia {
    fn user_media(&self) -> Result<LocalStream, MediaError> {
        if self.deny {
            return Err(MediaError::PermissionDenied("camera and microphone"));
        }
        Ok(LocalStream {
            audio: MediaTrack::new(TrackKind::Audio, "synthetic microphone"),
            video: MediaTrack::new(TrackKind::Video, "synthetic camera"),
        })
    }

    fn display_media(&self) -> Result<MediaTrack, MediaError> {
        if self.deny {
            return Err(MediaError::PermissionDenied("screen capture"));
        }
        Ok(MediaTrack::new(TrackKind::Video, "synthetic screen"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denied_media_blocks() {
        // テスト項目: 権限が拒否された場合はエラーになる
        // given (前提条件):
        let media = SyntheticMedia::new(true);

        // when (操作):
        let result = media.user_media();

        // then (期待する結果):
        assert!(matches!(result, Err(MediaError::PermissionDenied(_))));
    }

    #[test]
    fn test_user_media_has_audio_and_video() {
        // テスト項目: カメラとマイクのトラックが取得できる
        // given (前提条件):
        let media = SyntheticMedia::default();

        // when (操作):
        let stream = media.user_media().unwrap();

        // then (期待する結果):
        assert_eq!(stream.audio.kind, TrackKind::Audio);
        assert_eq!(stream.video.kind, TrackKind::Video);
        assert_ne!(stream.audio.id, stream.video.id);
    }
}
