pub mod envelope;
pub mod id;

pub use envelope::{RoomEnvelope, RoomRef};
