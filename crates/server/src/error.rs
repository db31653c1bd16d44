//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. Error bodies are JSON (`{"error": "…"}`), matching
//! the rest of the API surface.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::gate::AuthorizeError;
use crate::services::{DecodeError, ReportError};
use crate::store::StoreError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Download authorization denied or failed.
    #[error("Authorize error: {0}")]
    Authorize(#[from] AuthorizeError),

    /// VIN decoding via vPIC failed.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Report generation failed.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authorized for this operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is a server-side failure worth reporting.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Report(_) | Self::Internal(_) => true,
            Self::Store(e) => matches!(e, StoreError::Storage(_) | StoreError::Corrupt(_)),
            Self::Authorize(e) => matches!(e, AuthorizeError::Store(_)),
            Self::Decode(_)
            | Self::BadRequest(_)
            | Self::NotFound(_)
            | Self::Unauthorized(_) => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Store(e) => match e {
                StoreError::NotFound => StatusCode::NOT_FOUND,
                StoreError::InvalidState { .. } => StatusCode::CONFLICT,
                StoreError::Storage(_) | StoreError::Corrupt(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Authorize(e) => match e {
                AuthorizeError::MissingToken => StatusCode::BAD_REQUEST,
                AuthorizeError::InvalidToken => StatusCode::NOT_FOUND,
                AuthorizeError::TokenExpired => StatusCode::GONE,
                AuthorizeError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Decode(_) => StatusCode::BAD_GATEWAY,
            Self::Report(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Client-facing message. Internal failure details are never exposed;
    /// token denial messages are deliberately uniform so callers cannot
    /// probe whether a token once existed.
    fn message(&self) -> String {
        match self {
            Self::Store(e) => match e {
                StoreError::NotFound => "Order not found".to_string(),
                StoreError::InvalidState { current } => {
                    format!("Operation not valid for order in status '{current}'")
                }
                StoreError::Storage(_) | StoreError::Corrupt(_) => {
                    "Internal server error".to_string()
                }
            },
            Self::Authorize(e) => match e {
                AuthorizeError::MissingToken => "Download token is required".to_string(),
                AuthorizeError::InvalidToken => {
                    "Download link is invalid or has already been used".to_string()
                }
                AuthorizeError::TokenExpired => {
                    "Download link has expired; request a new one".to_string()
                }
                AuthorizeError::Store(_) => "Internal server error".to_string(),
            },
            Self::Decode(_) => "Failed to fetch VIN data".to_string(),
            Self::Report(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::BadRequest(msg) | Self::NotFound(msg) | Self::Unauthorized(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status = self.status();
        let body = Json(json!({ "error": self.message() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
