//! Domain layer: room model and the interfaces the use cases depend on.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{Member, MemberRemoval, PomodoroPolicy, Room, RoomSnapshot};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::RoomRepository;
pub use value_object::{ConnectionId, DisplayName, RoomId, Timestamp};
