//! Read-only view of the monitored upstream rooms.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{ApiError, ApiErrorBody};
use crate::monitor::registry::RoomStatus;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/{room_id}", get(get_room))
}

// ---------------------------------------------------------------------------
// GET /api/v1/rooms
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "Rooms",
    responses(
        (status = 200, description = "Monitored rooms ordered by id", body = Vec<RoomStatus>),
    ),
)]
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomStatus>> {
    Json(state.monitors.list())
}

// ---------------------------------------------------------------------------
// GET /api/v1/rooms/:room_id
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}",
    tag = "Rooms",
    params(
        ("room_id" = String, Path, description = "Upstream room ID"),
    ),
    responses(
        (status = 200, description = "Monitor status", body = RoomStatus),
        (status = 404, description = "Room not monitored", body = ApiErrorBody),
    ),
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomStatus>, ApiError> {
    state
        .monitors
        .get(&room_id)
        .map(Json)
        .ok_or_else(|| ApiError::room_not_monitored(room_id))
}
