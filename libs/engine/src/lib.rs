//! Room event ingestion and session state engine.
//!
//! An [`Engine`] consumes raw room frames one at a time and answers each
//! with an ordered batch of [`Instruction`]s for a rendering layer to
//! apply. It never renders anything itself.

pub mod decode;
pub mod engine;
pub mod error;
pub mod instruction;
pub mod lifecycle;
pub mod registry;
pub mod render;
pub mod session;
pub mod visibility;

pub use decode::{decode, DecodedEvent, DecodedFrame};
pub use engine::{Engine, EngineConfig};
pub use error::DecodeError;
pub use instruction::Instruction;
pub use session::{LifecycleState, LogHandle, RoomSession};
