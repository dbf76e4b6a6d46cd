//! UseCase 層のエラー

use thiserror::Error;

use crate::domain::{MessagePushError, RepositoryError, ValueObjectError};

/// `join-room` の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("malformed join-room payload: {0}")]
    InvalidPayload(#[from] ValueObjectError),

    #[error("connection '{0}' has already joined room '{1}'")]
    AlreadyJoined(String, String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Push(#[from] MessagePushError),
}

/// `sending-signal` / `returning-signal` の中継失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("malformed signal payload: {0}")]
    InvalidPayload(#[from] ValueObjectError),

    #[error("relay target '{0}' is not connected")]
    TargetNotFound(String),

    #[error("failed to relay signal: {0}")]
    PushFailed(String),
}

impl From<MessagePushError> for RelayError {
    fn from(e: MessagePushError) -> Self {
        match e {
            MessagePushError::ClientNotFound(id) => Self::TargetNotFound(id),
            MessagePushError::PushFailed(reason) => Self::PushFailed(reason),
        }
    }
}

/// チャット / Pomodoro / ホワイトボード / 退出 などルーム単位イベントの失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomEventError {
    #[error("malformed payload: {0}")]
    InvalidPayload(#[from] ValueObjectError),

    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    Push(#[from] MessagePushError),
}

impl From<RepositoryError> for RoomEventError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::RoomNotFound(id) => Self::RoomNotFound(id),
            other => Self::Repository(other),
        }
    }
}
