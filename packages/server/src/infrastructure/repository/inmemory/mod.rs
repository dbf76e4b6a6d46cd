//! Process-local registry.

mod room;

pub use room::InMemoryRoomRepository;
