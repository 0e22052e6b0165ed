//! Authentication Error Types
//!
//! Centralized error handling for all authentication operations.
//! Every variant maps to a fixed status and message; nothing internal
//! is ever rendered into a response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::password::PasswordError;
use crate::repository::RepositoryError;
use crate::token::TokenError;

/// Authentication errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("Missing fields")]
    Validation(String),

    #[error("Username or email already taken")]
    Conflict,

    #[error("Registration error")]
    Registration,

    #[error("Login error")]
    LoginFault,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("User not found")]
    NotFound,

    #[error("Password hashing error")]
    Hashing,

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::Conflict | AuthError::Registration => {
                StatusCode::BAD_REQUEST
            }
            AuthError::InvalidCredentials | AuthError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::LoginFault
            | AuthError::Hashing
            | AuthError::Repository(_)
            | AuthError::Config(_)
            | AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            AuthError::NotFound => status.into_response(),
            AuthError::Hashing
            | AuthError::Repository(_)
            | AuthError::Config(_)
            | AuthError::Internal => {
                tracing::error!(error = %self, "Request failed with internal error");
                status.into_response()
            }
            _ => (
                status,
                Json(serde_json::json!({
                    "message": self.to_string()
                })),
            )
                .into_response(),
        }
    }
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        tracing::error!("Repository error: {:?}", err);
        AuthError::Repository(err.to_string())
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Hashing
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(_) => {
                tracing::error!("Token signing error: {:?}", err);
                AuthError::Internal
            }
            _ => {
                tracing::debug!("Session token rejected: {:?}", err);
                AuthError::Unauthenticated
            }
        }
    }
}
