use thiserror::Error;

/// Why a raw frame could not be turned into an event.
///
/// The engine never surfaces these to the consumer: a rejected frame is
/// dropped without touching any room.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame has no `,` separator")]
    MissingSeparator,
    #[error("frame prefix is empty")]
    EmptyPrefix,
    #[error("frame body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame body is not a JSON array")]
    NotAnArray,
    #[error("frame array has {0} elements, expected 2")]
    Arity(usize),
}
