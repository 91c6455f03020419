//! Middleware for JWT token validation and authentication

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;
use uuid::Uuid;

use crate::{AppState, error::AuthError};

/// Id of the user owning the presented access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

/// Extract and validate the access token from the Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AuthError::Unauthorized)?;

    let claims = state
        .jwt_service
        .validate_access_token(bearer.token())
        .map_err(|e| {
            debug!("Failed to validate token: {}", e);
            AuthError::Unauthorized
        })?;

    // Add user ID to request extensions for use in handlers
    req.extensions_mut().insert(CurrentUser(claims.sub));

    Ok(next.run(req).await)
}
