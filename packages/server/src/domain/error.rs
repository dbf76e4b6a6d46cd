//! Domain layer errors.

use thiserror::Error;

/// Value object construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("display name must not be blank")]
    BlankDisplayName,
}

/// Room registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("connection '{0}' is already a member of room '{1}'")]
    MemberAlreadyExists(String, String),

    #[error("connection '{0}' is not a member of room '{1}'")]
    MemberNotFound(String, String),
}

/// Errors raised while pushing frames to connected clients
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
