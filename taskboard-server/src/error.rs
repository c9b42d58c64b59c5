//! Mapping of board failures onto HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use taskboard_kanban::BoardError;
use thiserror::Error;

/// Errors a request handler can produce
#[derive(Debug, Error)]
pub enum ApiError {
    /// The board rejected or failed the command
    #[error(transparent)]
    Board(#[from] BoardError),

    /// The request body is not JSON of the expected shape
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Board(error) => match error {
                BoardError::MissingField { .. }
                | BoardError::Validation { .. }
                | BoardError::InvalidId { .. }
                | BoardError::InvalidReorderSet { .. } => StatusCode::BAD_REQUEST,
                BoardError::Unauthorized { .. } => StatusCode::FORBIDDEN,
                BoardError::TaskNotFound { .. }
                | BoardError::UserNotFound { .. }
                | BoardError::Unchanged { .. } => StatusCode::NOT_FOUND,
                BoardError::LockContention { .. } => StatusCode::CONFLICT,
                BoardError::Store(_) | BoardError::Io(_) | BoardError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidBody(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal details stay in the log
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
