//! The relay envelope that carries one raw room frame to dashboards.

use serde::{Deserialize, Serialize};

/// Identity of an observed room as known by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    pub id: String,
    /// Map the room was listed with, if the lobby reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_id: Option<String>,
}

impl RoomRef {
    pub fn new(id: impl Into<String>, map_id: Option<String>) -> Self {
        Self {
            id: id.into(),
            map_id,
        }
    }
}

/// One relayed frame: `{ room: {id, mapId}, message, eventType }`.
///
/// `message` is the untouched upstream text (`<prefix>,<jsonArray>`);
/// dashboards decode it themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEnvelope {
    pub room: RoomRef,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

impl RoomEnvelope {
    pub fn new(room: RoomRef, message: impl Into<String>, event_type: Option<String>) -> Self {
        Self {
            room,
            message: message.into(),
            event_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_uses_camel_case_on_the_wire() {
        let envelope = RoomEnvelope::new(
            RoomRef::new("R1", Some("neon-city".to_string())),
            "42/api/game,[\"dice-rolled\",{}]",
            Some("dice-rolled".to_string()),
        );
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["room"]["id"], "R1");
        assert_eq!(value["room"]["mapId"], "neon-city");
        assert_eq!(value["eventType"], "dice-rolled");
    }

    #[test]
    fn envelope_accepts_missing_map_and_event_type() {
        let envelope: RoomEnvelope =
            serde_json::from_str(r#"{"room":{"id":"R2"},"message":"x,[\"a\",1]"}"#).unwrap();
        assert_eq!(envelope.room.map_id, None);
        assert_eq!(envelope.event_type, None);
    }
}
