//! Tag and ingredient endpoints
//!
//! Both collections are served by the same handlers; the router for each
//! collection carries its [`AttributeKind`] as a request extension.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{AttributeFilter, AttributeKind, AttributePayload, AttributeQuery, AttributeResponse},
    serializers,
    state::AppState,
};

/// Routes of one attribute collection
pub fn router(kind: AttributeKind) -> Router<AppState> {
    Router::new()
        .route("/", get(list_attributes).post(create_attribute))
        .route(
            "/:id",
            get(get_attribute)
                .put(update_attribute)
                .patch(update_attribute)
                .delete(delete_attribute),
        )
        .layer(Extension(kind))
}

/// List the caller's tags or ingredients, optionally only those used by recipes
pub async fn list_attributes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(kind): Extension<AttributeKind>,
    Query(query): Query<AttributeQuery>,
) -> ApiResult<Json<Vec<AttributeResponse>>> {
    let filter = AttributeFilter {
        assigned_only: serializers::parse_flag("assigned_only", query.assigned_only.as_deref())?,
    };

    let attributes = state
        .attributes
        .list(user.id, kind, filter)
        .await
        .map_err(|e| ApiError::internal("Failed to list attributes", e))?;

    Ok(Json(
        attributes.into_iter().map(AttributeResponse::from).collect(),
    ))
}

/// Create a tag or ingredient owned by the caller
pub async fn create_attribute(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(kind): Extension<AttributeKind>,
    payload: Result<Json<AttributePayload>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let name = serializers::validate_attribute(&payload)?;

    let attribute = state
        .attributes
        .create(user.id, kind, &name)
        .await
        .map_err(|e| ApiError::internal("Failed to create attribute", e))?;

    Ok((StatusCode::CREATED, Json(AttributeResponse::from(attribute))))
}

/// Get one of the caller's tags or ingredients
pub async fn get_attribute(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(kind): Extension<AttributeKind>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AttributeResponse>> {
    let attribute = state
        .attributes
        .get(user.id, kind, id)
        .await
        .map_err(|e| ApiError::internal("Failed to get attribute", e))?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(attribute.into()))
}

/// Rename one of the caller's tags or ingredients
pub async fn update_attribute(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(kind): Extension<AttributeKind>,
    Path(id): Path<i64>,
    payload: Result<Json<AttributePayload>, JsonRejection>,
) -> ApiResult<Json<AttributeResponse>> {
    let Json(payload) = payload?;
    let name = serializers::validate_attribute(&payload)?;

    let attribute = state
        .attributes
        .rename(user.id, kind, id, &name)
        .await
        .map_err(|e| ApiError::internal("Failed to update attribute", e))?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(attribute.into()))
}

/// Delete one of the caller's tags or ingredients
pub async fn delete_attribute(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(kind): Extension<AttributeKind>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = state
        .attributes
        .delete(user.id, kind, id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete attribute", e))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
