//! Error types and response classification for notekeep
//!
//! Every failure is scoped to a single request. The classification maps
//! onto HTTP status families:
//! - Client: malformed or missing input (400)
//! - NotFound: the addressed record does not exist (404)
//! - Server: storage faults and anything unexpected (500)

mod macros;

use thiserror::Error;

/// Result alias used throughout the core
pub type Result<T> = std::result::Result<T, NotekeepError>;

/// Status family of an error, independent of the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    /// Caller supplied bad input
    Client,
    /// Addressed record is missing
    NotFound,
    /// Storage or internal fault
    Server,
}

impl From<rusqlite::Error> for NotekeepError {
    fn from(err: rusqlite::Error) -> Self {
        NotekeepError::Storage(err.to_string())
    }
}

/// Errors that can occur during notekeep operations
#[derive(Error, Debug)]
pub enum NotekeepError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("failed to {operation}: {reason}")]
    FailedOperation { operation: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl NotekeepError {
    /// Create a validation error for a named field
    pub fn validation(field: &str, reason: impl std::fmt::Display) -> Self {
        NotekeepError::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        NotekeepError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for a failed database operation
    pub fn db_operation(operation: &str, error: impl std::fmt::Display) -> Self {
        NotekeepError::FailedOperation {
            operation: operation.to_string(),
            reason: error.to_string(),
        }
    }

    /// Get the status family for this error
    pub fn status(&self) -> ErrorStatus {
        match self {
            NotekeepError::Validation { .. } => ErrorStatus::Client,
            NotekeepError::NotFound { .. } => ErrorStatus::NotFound,
            NotekeepError::Storage(_)
            | NotekeepError::FailedOperation { .. }
            | NotekeepError::Io(_)
            | NotekeepError::Json(_)
            | NotekeepError::Toml(_)
            | NotekeepError::Other(_) => ErrorStatus::Server,
        }
    }

    /// Human-readable error category, used as the `error` field of responses
    pub fn category(&self) -> &'static str {
        match self {
            NotekeepError::Validation { .. } => "Validation failed",
            NotekeepError::NotFound { .. } => "Not found",
            NotekeepError::Storage(_) | NotekeepError::FailedOperation { .. } => {
                "Storage operation failed"
            }
            NotekeepError::Io(_)
            | NotekeepError::Json(_)
            | NotekeepError::Toml(_)
            | NotekeepError::Other(_) => "Internal server error",
        }
    }

    /// Name of the offending field, for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            NotekeepError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Convert error to the JSON error envelope:
    /// `{success: false, error, details[, field]}`
    pub fn to_json(&self) -> serde_json::Value {
        let mut envelope = serde_json::json!({
            "success": false,
            "error": self.category(),
            "details": self.to_string(),
        });

        if let Some(field) = self.field() {
            envelope["field"] = serde_json::Value::String(field.to_string());
        }

        envelope
    }
}
