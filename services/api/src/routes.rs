//! API service routes

use axum::{Json, Router, middleware, response::IntoResponse, routing::get};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{middleware::auth_middleware, models::AttributeKind, state::AppState};

pub mod attributes;
pub mod recipes;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .nest("/tags", attributes::router(AttributeKind::Tag))
        .nest("/ingredients", attributes::router(AttributeKind::Ingredient))
        .nest("/recipes", recipes::router(state.media.max_upload_bytes()))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/recipe", protected_routes)
        .nest_service("/media", ServeDir::new(state.media.root()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "recipe-api"
    }))
}
