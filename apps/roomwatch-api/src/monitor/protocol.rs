//! The slice of the upstream socket.io / Engine.IO text protocol we speak.

use chrono::{DateTime, Utc};
use roomwatch_common::RoomRef;
use serde_json::Value;

/// Engine.IO ping from the server, answered with [`PONG`].
pub const PING: &str = "2";
pub const PONG: &str = "3";

pub const LOBBY_NAMESPACE_CONNECT: &str = "40/api/lobby,";
pub const GAME_NAMESPACE_CONNECT: &str = "40/api/game,";
/// Sent after joining the lobby namespace; the lobby answers with its room list.
pub const LOBBY_NUDGE: &str = "1";

const LOBBY_ROOMS_PREFIX: &str = "42/api/lobby,[\"lobby-rooms-list\"";

/// WebSocket URL for a fresh Engine.IO v4 connection.
pub fn ws_url(base: &str, now: DateTime<Utc>) -> String {
    format!(
        "{base}?EIO=4&transport=websocket&t={}",
        now.timestamp_millis()
    )
}

/// `42/api/game,["enter-room",{"roomId":...}]`
pub fn join_room_payload(room_id: &str) -> String {
    let event = serde_json::json!(["enter-room", { "roomId": room_id }]);
    format!("42/api/game,{event}")
}

pub fn is_ping(msg: &str) -> bool {
    msg == PING
}

/// JSON document after the first comma of a namespaced packet.
pub fn json_body(msg: &str) -> Option<Value> {
    let (_, body) = msg.split_once(',')?;
    serde_json::from_str(body).ok()
}

/// Rooms listed by a `lobby-rooms-list` packet, or `None` for any other packet.
///
/// A room's map is read from `mapId` or `map.id` when present.
pub fn parse_lobby_rooms(msg: &str) -> Option<Vec<RoomRef>> {
    if !msg.starts_with(LOBBY_ROOMS_PREFIX) {
        return None;
    }
    let body = json_body(msg)?;
    let rooms = body.get(1)?.get("rooms")?.as_array()?;

    Some(
        rooms
            .iter()
            .filter_map(|room| {
                let id = room.get("id")?.as_str()?;
                let map_id = room
                    .get("mapId")
                    .or_else(|| room.get("map").and_then(|m| m.get("id")))
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string);
                Some(RoomRef::new(id, map_id))
            })
            .collect(),
    )
}
