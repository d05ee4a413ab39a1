//! Mapping of service errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use storybook_error::{StorybookError, StorybookErrorKind};
use tracing::error;

/// Error returned by HTTP handlers: a status and an `{ "error": ... }` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Response status
    pub status: StatusCode,
    /// Message placed under `error`
    pub message: String,
}

impl ApiError {
    /// Error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 404 for an unknown book id.
    pub fn book_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Book not found")
    }
}

impl From<StorybookError> for ApiError {
    fn from(err: StorybookError) -> Self {
        if err.is_not_found() {
            return Self::book_not_found();
        }
        let status = match err.kind() {
            StorybookErrorKind::Validation(_) | StorybookErrorKind::Json(_) => {
                StatusCode::BAD_REQUEST
            }
            StorybookErrorKind::Provider(e) => StatusCode::from_u16(e.kind.status_code())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %err, "Request failed");
        }
        Self::new(status, err.message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"error": self.message}))).into_response()
    }
}
