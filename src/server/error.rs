//! Error responses for the HTTP API

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use notekeep_core::error::{ErrorStatus, NotekeepError};

/// An error on its way out as an HTTP response
#[derive(Debug)]
pub enum ApiError {
    /// Failure reported by the core
    Core(NotekeepError),
    /// Request body exceeded the configured limit
    PayloadTooLarge(String),
}

impl From<NotekeepError> for ApiError {
    fn from(err: NotekeepError) -> Self {
        ApiError::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::Core(NotekeepError::validation("body", rejection.body_text()))
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Core(err) => match err.status() {
                ErrorStatus::Client => StatusCode::BAD_REQUEST,
                ErrorStatus::NotFound => StatusCode::NOT_FOUND,
                ErrorStatus::Server => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            ApiError::Core(err) => err.to_json(),
            ApiError::PayloadTooLarge(details) => serde_json::json!({
                "success": false,
                "error": "Payload too large",
                "details": details,
            }),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Core(err) => write!(f, "{}", err),
            ApiError::PayloadTooLarge(details) => write!(f, "payload too large: {}", details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        (status, Json(self.to_json())).into_response()
    }
}

/// Result type for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;
