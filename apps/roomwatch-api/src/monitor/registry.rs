//! Registry of monitored upstream rooms and their relay status.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use roomwatch_common::RoomRef;
use serde::Serialize;
use utoipa::ToSchema;

/// Connection status of one room monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MonitorStatus {
    Connecting,
    Connected,
    Disconnected,
}

/// Per-room monitor metadata.
struct MonitorEntry {
    room: RoomRef,
    status: MonitorStatus,
    connect_attempts: u32,
    frames_relayed: u64,
    last_event: Option<String>,
    last_frame_at: Option<DateTime<Utc>>,
    disconnected_at: Option<DateTime<Utc>>,
}

/// Snapshot of a monitored room, as served by the REST API.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RoomStatus {
    pub room_id: String,
    pub map_id: Option<String>,
    pub status: MonitorStatus,
    pub connect_attempts: u32,
    pub frames_relayed: u64,
    pub last_event: Option<String>,
    pub last_frame_at: Option<DateTime<Utc>>,
    pub disconnected_at: Option<DateTime<Utc>>,
}

impl From<&MonitorEntry> for RoomStatus {
    fn from(e: &MonitorEntry) -> Self {
        Self {
            room_id: e.room.id.clone(),
            map_id: e.room.map_id.clone(),
            status: e.status,
            connect_attempts: e.connect_attempts,
            frames_relayed: e.frames_relayed,
            last_event: e.last_event.clone(),
            last_frame_at: e.last_frame_at,
            disconnected_at: e.disconnected_at,
        }
    }
}

/// Shared registry of all room monitors.
///
/// Uses `DashMap` for shard-level concurrency and `parking_lot::Mutex` per
/// entry for non-poisoning, fast locking.
pub struct MonitorRegistry {
    rooms: DashMap<String, Mutex<MonitorEntry>>,
}

impl Default for MonitorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Register a room before its monitor starts. Returns false if the room
    /// is already monitored.
    pub fn register(&self, room: &RoomRef) -> bool {
        match self.rooms.entry(room.id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Mutex::new(MonitorEntry {
                    room: room.clone(),
                    status: MonitorStatus::Connecting,
                    connect_attempts: 0,
                    frames_relayed: 0,
                    last_event: None,
                    last_frame_at: None,
                    disconnected_at: None,
                }));
                true
            }
        }
    }

    /// A connection attempt is starting.
    pub fn mark_connecting(&self, room_id: &str) {
        if let Some(entry) = self.rooms.get(room_id) {
            let mut e = entry.lock();
            e.status = MonitorStatus::Connecting;
            e.connect_attempts += 1;
        }
    }

    /// The monitor joined the room and is relaying.
    pub fn mark_connected(&self, room_id: &str) {
        if let Some(entry) = self.rooms.get(room_id) {
            let mut e = entry.lock();
            e.status = MonitorStatus::Connected;
            e.disconnected_at = None;
        }
    }

    /// The upstream connection ended (sets `disconnected_at`).
    pub fn mark_disconnected(&self, room_id: &str) {
        if let Some(entry) = self.rooms.get(room_id) {
            let mut e = entry.lock();
            e.status = MonitorStatus::Disconnected;
            e.disconnected_at = Some(Utc::now());
        }
    }

    /// Count one relayed frame.
    pub fn record_frame(&self, room_id: &str, event_name: &str) {
        if let Some(entry) = self.rooms.get(room_id) {
            let mut e = entry.lock();
            e.frames_relayed += 1;
            e.last_event = Some(event_name.to_string());
            e.last_frame_at = Some(Utc::now());
        }
    }

    pub fn get(&self, room_id: &str) -> Option<RoomStatus> {
        let entry = self.rooms.get(room_id)?;
        let e = entry.lock();
        Some(RoomStatus::from(&*e))
    }

    /// All monitored rooms, ordered by room id.
    pub fn list(&self) -> Vec<RoomStatus> {
        let mut rooms: Vec<RoomStatus> = self
            .rooms
            .iter()
            .map(|entry| RoomStatus::from(&*entry.value().lock()))
            .collect();
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
