use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Machine-readable error codes of the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The room id has no upstream monitor.
    RoomNotMonitored,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::RoomNotMonitored => StatusCode::NOT_FOUND,
        }
    }
}

/// Structured API error returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    /// Room the error refers to, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

/// Application-level error type that converts into an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub room_id: Option<String>,
}

impl ApiError {
    pub fn room_not_monitored(room_id: impl Into<String>) -> Self {
        let room_id = room_id.into();
        Self {
            code: ErrorCode::RoomNotMonitored,
            message: format!("Room {room_id} is not monitored"),
            room_id: Some(room_id),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorDetail {
                code: self.code,
                message: self.message,
                room_id: self.room_id,
            },
        };
        (self.code.status(), Json(body)).into_response()
    }
}
