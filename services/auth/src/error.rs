//! Error types for the authentication service

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Validation messages keyed by field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Errors returned by the authentication endpoints
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Unable to authenticate with provided credentials")]
    InvalidCredentials,

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl AuthError {
    /// Log a failure and hide its details from the client
    pub fn internal(context: &str, error: anyhow::Error) -> Self {
        tracing::error!("{}: {:#}", context, error);
        AuthError::InternalServerError
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": message })),
            AuthError::InvalidCredentials | AuthError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            AuthError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "fields": fields }),
            ),
            AuthError::Conflict(_) => (StatusCode::CONFLICT, json!({ "error": message })),
            AuthError::InternalServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AuthError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidCredentials.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Conflict("taken".to_string())
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::Validation(FieldErrors::new())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_invalid_credentials_message() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Unable to authenticate with provided credentials"
        );
    }
}
