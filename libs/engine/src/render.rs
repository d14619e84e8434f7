//! Display helpers: payload lines, times and map labels.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Map id assumed for rooms whose map is not known.
pub const UNKNOWN_MAP: &str = "unknown";
/// The default map; rooms on it are not highlighted.
pub const CLASSIC_MAP: &str = "classic";

/// One `key: value` line of a rendered payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadLine {
    pub key: String,
    pub value: String,
}

/// Flatten a payload one level deep.
///
/// Objects give one line per key in wire order, arrays one line per index.
/// Nested values are rendered as compact JSON and strings are unquoted.
/// A scalar payload becomes a single `value` line; an absent one has no lines.
pub fn payload_lines(payload: Option<&Value>) -> Vec<PayloadLine> {
    match payload {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(map)) => map.iter().map(|(k, v)| line(k.clone(), v)).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| line(i.to_string(), v))
            .collect(),
        Some(scalar) => vec![line("value".to_string(), scalar)],
    }
}

fn line(key: String, value: &Value) -> PayloadLine {
    let value = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    PayloadLine { key, value }
}

/// Local wall-clock time shown next to an entry.
pub fn display_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Human label for a map id: first `-` becomes a space, absent maps read "unknown".
pub fn map_label(map_id: Option<&str>) -> String {
    map_id.unwrap_or(UNKNOWN_MAP).replacen('-', " ", 1)
}

/// Rooms on a known, non-classic map are worth highlighting.
pub fn is_relevant_map(map_id: Option<&str>) -> bool {
    matches!(map_id, Some(id) if id != CLASSIC_MAP)
}
