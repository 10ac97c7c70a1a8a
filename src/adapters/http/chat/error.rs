//! Error mapping for chat endpoints.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{DirectChatError, OpenStreamError, PrepareStreamError};
use crate::domain::foundation::{ErrorCode, ValidationError};

use super::dto::ErrorResponse;

pub const SESSION_ID_REQUIRED: &str = "Session ID is required.";
pub const SESSION_NOT_FOUND: &str =
    "Session not found or expired. Please try sending your message again.";

/// Every non-streaming failure a chat endpoint can return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatApiError {
    BadRequest { message: String, code: ErrorCode },
    PayloadTooLarge,
    NotFound { message: String },
    Internal { message: String },
}

impl ChatApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ChatApiError::BadRequest {
            message: message.into(),
            code: ErrorCode::ValidationFailed,
        }
    }

    pub fn session_not_found() -> Self {
        ChatApiError::NotFound {
            message: SESSION_NOT_FOUND.to_string(),
        }
    }

    /// Maps a body extraction failure. Only an oversized body keeps its own status.
    pub fn from_rejection(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ChatApiError::PayloadTooLarge;
        }
        ChatApiError::BadRequest {
            message: format!("Request body must be valid JSON: {}", rejection.body_text()),
            code: ErrorCode::InvalidFormat,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ChatApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ChatApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ChatApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ChatApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn to_body(&self) -> ErrorResponse {
        match self {
            ChatApiError::BadRequest { message, code } => ErrorResponse::new(message, *code),
            ChatApiError::PayloadTooLarge => {
                ErrorResponse::new("Request body is too large.", ErrorCode::PayloadTooLarge)
            }
            ChatApiError::NotFound { message } => {
                ErrorResponse::new(message, ErrorCode::SessionNotFound)
            }
            ChatApiError::Internal { message } => {
                ErrorResponse::new(message, ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_body())).into_response()
    }
}

impl From<ValidationError> for ChatApiError {
    fn from(err: ValidationError) -> Self {
        ChatApiError::BadRequest {
            message: err.to_string(),
            code: err.code(),
        }
    }
}

impl From<PrepareStreamError> for ChatApiError {
    fn from(err: PrepareStreamError) -> Self {
        match err {
            PrepareStreamError::Validation(e) => e.into(),
            PrepareStreamError::Store(e) => {
                tracing::error!(error = %e, "Failed to store prepared session");
                ChatApiError::Internal {
                    message: "Failed to create session.".to_string(),
                }
            }
        }
    }
}

impl From<OpenStreamError> for ChatApiError {
    fn from(err: OpenStreamError) -> Self {
        match err {
            OpenStreamError::SessionNotFound(id) => {
                tracing::info!(session_id = %id, "Stream requested for unknown or expired session");
                ChatApiError::session_not_found()
            }
        }
    }
}

impl From<DirectChatError> for ChatApiError {
    fn from(err: DirectChatError) -> Self {
        match err {
            DirectChatError::Validation(e) => e.into(),
        }
    }
}
