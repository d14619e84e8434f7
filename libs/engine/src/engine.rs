//! The per-connection ingestion engine.

use chrono::{DateTime, Utc};
use roomwatch_common::{RoomEnvelope, RoomRef};

use crate::decode::DecodedEvent;
use crate::instruction::Instruction;
use crate::lifecycle::{self, Outcome};
use crate::registry::TypeRegistry;
use crate::render;
use crate::session::{RoomSession, SessionTable};
use crate::visibility::{should_render, FilterState};

/// Default base for links to a room's public page.
pub const DEFAULT_ROOM_URL_BASE: &str = "https://richup.io/room/";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Prefix joined with the room id to build `room_url`.
    pub room_url_base: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            room_url_base: DEFAULT_ROOM_URL_BASE.to_string(),
        }
    }
}

/// Owns all room sessions, observed types and filter choices for one
/// dashboard. Frames are processed strictly one at a time.
#[derive(Debug, Default)]
pub struct Engine {
    config: EngineConfig,
    sessions: SessionTable,
    types: TypeRegistry,
    filters: FilterState,
    last_entry: u64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Ingest one relayed envelope at the current wall-clock time.
    pub fn ingest(&mut self, envelope: &RoomEnvelope) -> Vec<Instruction> {
        self.ingest_at(&envelope.room, &envelope.message, Utc::now())
    }

    /// Ingest one raw frame for `room`. Malformed frames yield no instructions.
    ///
    /// Batch order: `CreateRoomLog`?, `AppendLogEntry`, one lifecycle-level
    /// instruction?, `RegisterFilterControl`?.
    pub fn ingest_at(
        &mut self,
        room: &RoomRef,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Vec<Instruction> {
        let event = match DecodedEvent::from_frame(room, raw, now) {
            Ok(event) => event,
            Err(err) => {
                tracing::trace!(room_id = %room.id, %err, "dropping malformed frame");
                return Vec::new();
            }
        };

        let mut out = Vec::with_capacity(4);

        let (session, resolution) = self
            .sessions
            .resolve(&event.room_id, room.map_id.as_deref(), now);
        if resolution.needs_log() {
            tracing::debug!(
                room_id = %session.room_id,
                ?resolution,
                log = session.log.0,
                "creating room log"
            );
            out.push(create_room_log(session, &self.config));
        }

        let decision =
            lifecycle::evaluate(session.lifecycle, &event.event_name, event.payload.as_ref());

        self.last_entry += 1;
        let entry_id = self.last_entry;
        out.push(Instruction::AppendLogEntry {
            entry_id,
            room_id: session.room_id.clone(),
            log: session.log,
            event_name: event.event_name.clone(),
            observed_at: event.observed_at,
            display_time: render::display_time(event.observed_at),
            payload: render::payload_lines(event.payload.as_ref()),
            visible: should_render(&event.event_name, &self.filters),
        });

        session.lifecycle = decision.next;
        match decision.outcome {
            Outcome::Unchanged => {}
            Outcome::OfferRemoval => out.push(Instruction::OfferRemoval {
                room_id: session.room_id.clone(),
                entry_id,
            }),
            Outcome::UpdateMap(map_id) => {
                out.push(Instruction::UpdateMapLabel {
                    room_id: session.room_id.clone(),
                    map_label: render::map_label(Some(&map_id)),
                    is_relevant: render::is_relevant_map(Some(&map_id)),
                    map_id: map_id.clone(),
                });
                session.map_id = Some(map_id);
            }
            Outcome::Enter(lifecycle) => {
                tracing::debug!(
                    room_id = %session.room_id,
                    lifecycle = lifecycle.as_str(),
                    "room lifecycle changed"
                );
                out.push(Instruction::SetLifecycleVisual {
                    room_id: session.room_id.clone(),
                    lifecycle,
                });
            }
            Outcome::IgnoredAfterEnded(lifecycle) => {
                tracing::debug!(
                    room_id = %session.room_id,
                    event_name = %event.event_name,
                    ignored = lifecycle.as_str(),
                    "room already ended; lifecycle change ignored"
                );
            }
        }

        if self.types.register(&event.event_name) {
            let checked = self.filters.enable_default(&event.event_name);
            out.push(Instruction::RegisterFilterControl {
                event_name: event.event_name,
                checked,
            });
        }

        out
    }

    /// Apply the user's filter toggle to every entry of `event_name`.
    pub fn set_type_visibility(&mut self, event_name: &str, visible: bool) -> Instruction {
        self.filters.set(event_name, visible);
        Instruction::SetTypeVisibility {
            event_name: event_name.to_string(),
            visible,
            affected_entries: self.types.entry_count(event_name),
        }
    }

    /// The consumer removed `room_id`'s log. The next event for the room
    /// creates a fresh one. Returns false for unknown or already-removed rooms.
    pub fn remove_room_log(&mut self, room_id: &str) -> bool {
        let detached = self.sessions.detach(room_id);
        if detached {
            tracing::debug!(%room_id, "room log removed");
        }
        detached
    }

    pub fn session(&self, room_id: &str) -> Option<&RoomSession> {
        self.sessions.get(room_id)
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }
}

fn create_room_log(session: &RoomSession, config: &EngineConfig) -> Instruction {
    let map_id = session.map_id.as_deref();
    Instruction::CreateRoomLog {
        room_id: session.room_id.clone(),
        log: session.log,
        map_id: map_id.unwrap_or(render::UNKNOWN_MAP).to_string(),
        map_label: render::map_label(map_id),
        is_relevant: render::is_relevant_map(map_id),
        lifecycle: session.lifecycle,
        created_at: session.created_at,
        created_at_display: render::display_time(session.created_at),
        room_url: format!("{}{}", config.room_url_base, session.room_id),
    }
}
