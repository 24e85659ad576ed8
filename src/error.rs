//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::booking::responses::ErrorResponse;
use crate::booking::BookingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, Option<serde_json::Value>) {
        match self {
            AppError::Booking(err) => match err {
                BookingError::Validation(_) => (StatusCode::BAD_REQUEST, "ValidationError", None),
                BookingError::NotConfigured {
                    room_id,
                    guest_type,
                    guest_count,
                } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "NotConfiguredError",
                    Some(json!({
                        "roomId": room_id,
                        "guestType": guest_type,
                        "guestCount": guest_count,
                    })),
                ),
                BookingError::Conflict { room_id, conflicts } => (
                    StatusCode::CONFLICT,
                    "ConflictError",
                    Some(json!({
                        "roomId": room_id,
                        "conflictingBookings": conflicts,
                    })),
                ),
                BookingError::RoomNotFound(_)
                | BookingError::BookingNotFound(_)
                | BookingError::CustomerNotFound(_) => (StatusCode::NOT_FOUND, "NotFoundError", None),
                BookingError::Database(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "InternalError", None)
                }
            },
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "ValidationError",
                serde_json::to_value(errors.field_errors()).ok(),
            ),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "ValidationError", None),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFoundError", None),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError", None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, details) = self.parts();

        // Server-side failures are logged in full but never echoed to the client
        let message = if status.is_server_error() {
            tracing::error!("{}", self);
            "Internal server error".to_string()
        } else {
            tracing::debug!(error_type, "Request rejected: {}", self);
            self.to_string()
        };

        let body = ErrorResponse {
            error_type: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
