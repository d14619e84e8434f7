//! Frame decoding: `<prefix>,<jsonArray>` into a typed event.

use chrono::{DateTime, TimeZone, Utc};
use roomwatch_common::RoomRef;
use serde_json::Value;

use crate::error::DecodeError;

/// Event name used when the frame is well formed but element 0 is not a string.
pub const UNKNOWN_EVENT: &str = "unknown";

/// The `[eventName, payload]` pair carried by one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    pub event_name: String,
    /// `None` when the second element is JSON `null`.
    pub payload: Option<Value>,
}

/// A decoded frame bound to its room and display time.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    pub room_id: String,
    pub event_name: String,
    pub payload: Option<Value>,
    pub observed_at: DateTime<Utc>,
}

impl DecodedEvent {
    /// Decode `raw` for `room`. `now` is used as the display time unless the
    /// payload carries its own `timestamp`.
    pub fn from_frame(
        room: &RoomRef,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, DecodeError> {
        let frame = decode(raw)?;
        let observed_at = embedded_timestamp(frame.payload.as_ref()).unwrap_or(now);
        Ok(Self {
            room_id: room.id.clone(),
            event_name: frame.event_name,
            payload: frame.payload,
            observed_at,
        })
    }
}

/// Split on the first comma and parse the remainder as a 2-element array.
pub fn decode(raw: &str) -> Result<DecodedFrame, DecodeError> {
    let (prefix, body) = raw.split_once(',').ok_or(DecodeError::MissingSeparator)?;
    if prefix.is_empty() {
        return Err(DecodeError::EmptyPrefix);
    }

    let Value::Array(mut items) = serde_json::from_str::<Value>(body)? else {
        return Err(DecodeError::NotAnArray);
    };
    if items.len() != 2 {
        return Err(DecodeError::Arity(items.len()));
    }

    let payload = items.pop().filter(|v| !v.is_null());
    let event_name = match items.pop() {
        Some(Value::String(name)) => name,
        _ => UNKNOWN_EVENT.to_string(),
    };

    Ok(DecodedFrame {
        event_name,
        payload,
    })
}

/// Read `payload.timestamp` as epoch milliseconds or an RFC 3339 string.
///
/// Zero, empty strings and unparseable values count as absent.
pub fn embedded_timestamp(payload: Option<&Value>) -> Option<DateTime<Utc>> {
    match payload?.get("timestamp")? {
        Value::Number(n) => {
            let ms = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            if ms == 0 {
                return None;
            }
            Utc.timestamp_millis_opt(ms).single()
        }
        Value::String(s) if !s.is_empty() => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        _ => None,
    }
}
