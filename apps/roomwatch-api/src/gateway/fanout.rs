//! Broadcast hub carrying relayed room frames to connected dashboards.
//!
//! Uses a single `tokio::sync::broadcast` channel. Every room monitor
//! publishes into it and every dashboard connection subscribes; each
//! dashboard runs its own engine over the full stream.

use std::sync::Arc;

use roomwatch_common::RoomEnvelope;
use tokio::sync::broadcast;

/// Capacity of the broadcast channel. Slow receivers that fall behind will
/// skip frames (RecvError::Lagged).
const BROADCAST_CAPACITY: usize = 4096;

/// The global broadcast hub. Cloneable, store in AppState.
#[derive(Clone)]
pub struct RoomBroadcast {
    sender: broadcast::Sender<Arc<RoomEnvelope>>,
}

impl Default for RoomBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomBroadcast {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Subscribe to the broadcast channel. Each dashboard connection should
    /// call this once to get its own receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<RoomEnvelope>> {
        self.sender.subscribe()
    }

    /// Relay a frame to all connected dashboards. Returns how many received it.
    pub fn dispatch(&self, envelope: RoomEnvelope) -> usize {
        // send() returns Err if there are no receivers; the frame is simply dropped.
        self.sender.send(Arc::new(envelope)).unwrap_or(0)
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
