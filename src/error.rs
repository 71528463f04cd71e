//! Error types for the users API.
//!
//! [`ApiError`] is the taxonomy surfaced at the handler boundary. Each variant
//! maps to one HTTP status and one fixed JSON message; unexpected failures keep
//! their detail for server-side logging only.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

pub const MISSING_USER_ID_MESSAGE: &str = "UserId is required in the route.";
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found.";
pub const EMAIL_EXISTS_MESSAGE: &str = "A user with the given email already exists.";
pub const USERNAME_EXISTS_MESSAGE: &str = "A user with the given username already exists.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Main error type for user update operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Neither the route binding nor the request path yielded an identifier
    #[error("{}", MISSING_USER_ID_MESSAGE)]
    MissingUserId,

    /// No user document exists for the identifier
    #[error("{}", USER_NOT_FOUND_MESSAGE)]
    UserNotFound,

    /// Another user already has the supplied email
    #[error("{}", EMAIL_EXISTS_MESSAGE)]
    EmailExists,

    /// Another user already has the supplied username
    #[error("{}", USERNAME_EXISTS_MESSAGE)]
    UsernameExists,

    /// Store failures, malformed bodies, and anything else unanticipated
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Result type for user update operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Wrap any displayable failure as an unexpected error.
    pub fn unexpected(error: impl fmt::Display) -> Self {
        ApiError::Unexpected(error.to_string())
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingUserId | ApiError::EmailExists | ApiError::UsernameExists => {
                StatusCode::BAD_REQUEST
            }
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller. Never includes internal detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::MissingUserId => MISSING_USER_ID_MESSAGE,
            ApiError::UserNotFound => USER_NOT_FOUND_MESSAGE,
            ApiError::EmailExists => EMAIL_EXISTS_MESSAGE,
            ApiError::UsernameExists => USERNAME_EXISTS_MESSAGE,
            ApiError::Unexpected(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::Unexpected(format!("JSON error: {}", error))
    }
}

impl From<crate::store::StoreError> for ApiError {
    fn from(error: crate::store::StoreError) -> Self {
        ApiError::Unexpected(format!("Store error: {}", error))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.public_message() }));
        (self.status_code(), body).into_response()
    }
}
