//! Per-room session bookkeeping.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse game progress of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Waiting,
    Playing,
    Ended,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Waiting => "waiting",
            LifecycleState::Playing => "playing",
            LifecycleState::Ended => "ended",
        }
    }
}

/// Opaque reference to a consumer-owned visual log.
///
/// A fresh handle is issued every time a log is (re)created for a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogHandle(pub u64);

/// The engine's record of one observed room.
#[derive(Debug, Clone)]
pub struct RoomSession {
    pub room_id: String,
    pub map_id: Option<String>,
    pub lifecycle: LifecycleState,
    pub created_at: DateTime<Utc>,
    pub log: LogHandle,
    attached: bool,
}

impl RoomSession {
    fn new(
        room_id: &str,
        map_id: Option<String>,
        created_at: DateTime<Utc>,
        log: LogHandle,
    ) -> Self {
        Self {
            room_id: room_id.to_string(),
            map_id,
            lifecycle: LifecycleState::Waiting,
            created_at,
            log,
            attached: true,
        }
    }

    /// Whether the consumer still shows the log referenced by `log`.
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// How [`SessionTable::resolve`] found the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Existing,
    /// First event for this room.
    Created,
    /// The room's log had been removed and a new handle was issued.
    Reattached,
}

impl Resolution {
    /// True when the consumer needs a `CreateRoomLog` before any entry.
    pub fn needs_log(self) -> bool {
        !matches!(self, Resolution::Existing)
    }
}

/// Room id to session. Entries are created on first sight and never removed.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: HashMap<String, RoomSession>,
    last_log: u64,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `room_id`, creating a `Waiting` session when absent.
    ///
    /// An empty `map_hint` is treated as absent.
    pub fn resolve(
        &mut self,
        room_id: &str,
        map_hint: Option<&str>,
        now: DateTime<Utc>,
    ) -> (&mut RoomSession, Resolution) {
        let last_log = &mut self.last_log;
        match self.sessions.entry(room_id.to_string()) {
            Entry::Occupied(entry) => {
                let session = entry.into_mut();
                if session.attached {
                    return (session, Resolution::Existing);
                }
                *last_log += 1;
                session.log = LogHandle(*last_log);
                session.attached = true;
                (session, Resolution::Reattached)
            }
            Entry::Vacant(entry) => {
                *last_log += 1;
                let map_id = map_hint.filter(|m| !m.is_empty()).map(str::to_string);
                let session =
                    entry.insert(RoomSession::new(room_id, map_id, now, LogHandle(*last_log)));
                (session, Resolution::Created)
            }
        }
    }

    /// Mark the room's log as removed by the consumer. The session itself
    /// stays. Returns false if the room is unknown or already detached.
    pub fn detach(&mut self, room_id: &str) -> bool {
        match self.sessions.get_mut(room_id) {
            Some(session) if session.attached => {
                session.attached = false;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, room_id: &str) -> Option<&RoomSession> {
        self.sessions.get(room_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoomSession> {
        self.sessions.values()
    }
}
