//! Per-connection dashboard state.

use roomwatch_common::RoomEnvelope;
use roomwatch_engine::{Engine, EngineConfig, Instruction};

use super::events::GatewayMessage;

/// State for a single dashboard WebSocket connection.
///
/// Owns the connection's engine; it is only touched from that connection's
/// task, so frames and user toggles are applied strictly in sequence.
pub struct DashboardSession {
    /// Unique session identifier (`dash_` prefixed ULID).
    pub session_id: String,
    /// Message types requested at subscription time.
    pub message_types: Vec<String>,
    engine: Engine,
    /// Monotonically increasing sequence number for dispatch messages.
    seq: u64,
}

impl DashboardSession {
    pub fn new(session_id: String, message_types: Vec<String>, config: EngineConfig) -> Self {
        Self {
            session_id,
            message_types,
            engine: Engine::new(config),
            seq: 0,
        }
    }

    /// Get the next sequence number for a dispatch message.
    pub fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Run one relayed frame through the engine. Rejected frames yield nothing.
    pub fn ingest(&mut self, envelope: &RoomEnvelope) -> Vec<GatewayMessage> {
        let batch = self.engine.ingest(envelope);
        self.dispatch_all(batch)
    }

    /// Apply a filter toggle to all entries of `event_name`.
    pub fn toggle_visibility(
        &mut self,
        event_name: &str,
        visible: bool,
    ) -> Option<GatewayMessage> {
        let instruction = self.engine.set_type_visibility(event_name, visible);
        self.dispatch(&instruction)
    }

    /// The dashboard removed a room's log.
    pub fn remove_room_log(&mut self, room_id: &str) -> bool {
        self.engine.remove_room_log(room_id)
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Sequence and wrap one instruction. An instruction that fails to
    /// serialize is logged and skipped without consuming a sequence number.
    fn dispatch(&mut self, instruction: &Instruction) -> Option<GatewayMessage> {
        match GatewayMessage::instruction(instruction, self.seq + 1) {
            Ok(msg) => {
                self.seq += 1;
                Some(msg)
            }
            Err(err) => {
                tracing::error!(
                    session_id = %self.session_id,
                    instruction = instruction.name(),
                    %err,
                    "failed to serialize instruction"
                );
                None
            }
        }
    }

    fn dispatch_all(&mut self, batch: Vec<Instruction>) -> Vec<GatewayMessage> {
        batch.iter().filter_map(|i| self.dispatch(i)).collect()
    }
}
