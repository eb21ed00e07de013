pub mod broadcaster;
pub mod room_registry;

pub use broadcaster::Broadcaster;
pub use room_registry::{OutboundSender, RoomHandle, RoomRegistry};
