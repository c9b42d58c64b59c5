//! Error types for the board engine

use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors that can occur in board operations
#[derive(Debug, Error)]
pub enum BoardError {
    /// Missing required field
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    Validation { field: String, message: String },

    /// Identifier is not a well-formed task id
    #[error("invalid task id: {id}")]
    InvalidId { id: String },

    /// Requester does not own the task
    #[error("not authorized to modify task {id}")]
    Unauthorized { id: String },

    /// Task not found
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// User not found
    #[error("user not found: {uid}")]
    UserNotFound { uid: String },

    /// Update carried no change relative to the stored task
    #[error("no changes applied to task {id}")]
    Unchanged { id: String },

    /// Bulk reorder submission does not match the column membership
    #[error("invalid reorder set: {message}")]
    InvalidReorderSet { message: String },

    /// The task kept changing columns while we tried to lock it
    #[error("task {id} is being moved concurrently, retry")]
    LockContention { id: String },

    /// Persistence layer rejected the operation
    #[error("store error: {0}")]
    Store(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid reorder set error
    pub fn invalid_reorder(message: impl Into<String>) -> Self {
        Self::InvalidReorderSet {
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Whether the request itself was malformed
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::Validation { .. }
                | Self::InvalidId { .. }
                | Self::InvalidReorderSet { .. }
        )
    }

    /// Whether the failure originated in persistence rather than the request
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Io(_) | Self::Json(_))
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockContention { .. })
    }
}
