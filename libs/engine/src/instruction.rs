//! Data-only side effects for the rendering layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::render::PayloadLine;
use crate::session::{LifecycleState, LogHandle};

/// One directive for the consumer. Instructions carry plain data only, so
/// any rendering substrate can apply them in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instruction {
    /// Create the visual log for a room (first sight, or after removal).
    CreateRoomLog {
        room_id: String,
        log: LogHandle,
        /// Map id, or `"unknown"` when the room has none yet.
        map_id: String,
        map_label: String,
        is_relevant: bool,
        lifecycle: LifecycleState,
        created_at: DateTime<Utc>,
        created_at_display: String,
        room_url: String,
    },
    /// Add a filter checkbox for a newly observed event type.
    RegisterFilterControl { event_name: String, checked: bool },
    AppendLogEntry {
        entry_id: u64,
        room_id: String,
        log: LogHandle,
        event_name: String,
        observed_at: DateTime<Utc>,
        display_time: String,
        payload: Vec<PayloadLine>,
        visible: bool,
    },
    UpdateMapLabel {
        room_id: String,
        map_id: String,
        map_label: String,
        is_relevant: bool,
    },
    SetLifecycleVisual {
        room_id: String,
        lifecycle: LifecycleState,
    },
    /// Attach a "remove log" control to the given entry.
    OfferRemoval { room_id: String, entry_id: u64 },
    /// Show or hide every existing entry of a type, not only future ones.
    SetTypeVisibility {
        event_name: String,
        visible: bool,
        affected_entries: usize,
    },
}

impl Instruction {
    /// Wire name, identical to the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::CreateRoomLog { .. } => "CREATE_ROOM_LOG",
            Instruction::RegisterFilterControl { .. } => "REGISTER_FILTER_CONTROL",
            Instruction::AppendLogEntry { .. } => "APPEND_LOG_ENTRY",
            Instruction::UpdateMapLabel { .. } => "UPDATE_MAP_LABEL",
            Instruction::SetLifecycleVisual { .. } => "SET_LIFECYCLE_VISUAL",
            Instruction::OfferRemoval { .. } => "OFFER_REMOVAL",
            Instruction::SetTypeVisibility { .. } => "SET_TYPE_VISIBILITY",
        }
    }

    /// Room the instruction targets, if it is room-scoped.
    pub fn room_id(&self) -> Option<&str> {
        match self {
            Instruction::CreateRoomLog { room_id, .. }
            | Instruction::AppendLogEntry { room_id, .. }
            | Instruction::UpdateMapLabel { room_id, .. }
            | Instruction::SetLifecycleVisual { room_id, .. }
            | Instruction::OfferRemoval { room_id, .. } => Some(room_id.as_str()),
            Instruction::RegisterFilterControl { .. }
            | Instruction::SetTypeVisibility { .. } => None,
        }
    }
}
