//! Recipe endpoints

use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult, FieldErrors},
    middleware::AuthUser,
    models::{
        AttributeKind, Recipe, RecipeDetailResponse, RecipeImageResponse, RecipeInput,
        RecipePayload, RecipeQuery, RecipeResponse,
    },
    serializers,
    state::AppState,
    storage::ImageFormat,
};

const IMAGE_FIELD: &str = "image";
const NO_FILE: &str = "No file was submitted.";
const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Recipe routes; uploads are capped at `max_upload_bytes`
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route(
            "/:id",
            get(get_recipe)
                .put(replace_recipe)
                .patch(update_recipe)
                .delete(delete_recipe),
        )
        .route(
            "/:id/upload-image",
            post(upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

async fn find_recipe(state: &AppState, user: AuthUser, id: i64) -> ApiResult<Recipe> {
    state
        .recipes
        .get(user.id, id)
        .await
        .map_err(|e| ApiError::internal("Failed to get recipe", e))?
        .ok_or(ApiError::NotFound)
}

/// List the caller's recipes, newest first
pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<RecipeQuery>,
) -> ApiResult<Json<Vec<RecipeResponse>>> {
    let filter = serializers::recipe_filter(&query)?;

    let recipes = state
        .recipes
        .list(user.id, &filter)
        .await
        .map_err(|e| ApiError::internal("Failed to list recipes", e))?;

    Ok(Json(
        recipes
            .into_iter()
            .map(|recipe| serializers::recipe_response(recipe, &state.media))
            .collect(),
    ))
}

/// Create a recipe owned by the caller
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let input =
        serializers::deserialize_recipe(state.attributes.as_ref(), user.id, payload, None).await?;

    let recipe = state
        .recipes
        .create(user.id, &input)
        .await
        .map_err(|e| ApiError::internal("Failed to create recipe", e))?;

    info!("User {} created recipe {}", user.id, recipe.id);
    Ok((
        StatusCode::CREATED,
        Json(serializers::recipe_response(recipe, &state.media)),
    ))
}

/// Get one of the caller's recipes with its tags and ingredients expanded
pub async fn get_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RecipeDetailResponse>> {
    let recipe = find_recipe(&state, user, id).await?;

    let tags = state
        .attributes
        .find_by_ids(user.id, AttributeKind::Tag, &recipe.tag_ids)
        .await
        .map_err(|e| ApiError::internal("Failed to load recipe tags", e))?;
    let ingredients = state
        .attributes
        .find_by_ids(user.id, AttributeKind::Ingredient, &recipe.ingredient_ids)
        .await
        .map_err(|e| ApiError::internal("Failed to load recipe ingredients", e))?;

    Ok(Json(serializers::recipe_detail_response(
        recipe,
        tags,
        ingredients,
        &state.media,
    )))
}

/// Full update: every required field must be present
pub async fn replace_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> ApiResult<Json<RecipeResponse>> {
    let Json(payload) = payload?;
    // 404 before validation errors
    find_recipe(&state, user, id).await?;
    let input =
        serializers::deserialize_recipe(state.attributes.as_ref(), user.id, payload, None).await?;

    save_recipe(&state, user, id, input).await
}

/// Partial update: absent fields keep their value
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> ApiResult<Json<RecipeResponse>> {
    let Json(payload) = payload?;
    let existing = find_recipe(&state, user, id).await?;
    let input = serializers::deserialize_recipe(
        state.attributes.as_ref(),
        user.id,
        payload,
        Some(&existing),
    )
    .await?;

    save_recipe(&state, user, id, input).await
}

async fn save_recipe(
    state: &AppState,
    user: AuthUser,
    id: i64,
    input: RecipeInput,
) -> ApiResult<Json<RecipeResponse>> {
    let recipe = state
        .recipes
        .update(user.id, id, &input)
        .await
        .map_err(|e| ApiError::internal("Failed to update recipe", e))?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(serializers::recipe_response(recipe, &state.media)))
}

/// Delete one of the caller's recipes together with its image
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let recipe = find_recipe(&state, user, id).await?;

    let deleted = state
        .recipes
        .delete(user.id, id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete recipe", e))?;
    if !deleted {
        return Err(ApiError::NotFound);
    }

    if let Some(image) = recipe.image {
        if let Err(e) = state.media.remove(&image).await {
            warn!("Failed to remove image of deleted recipe {}: {}", id, e);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Attach an image to one of the caller's recipes
///
/// Expects a multipart body with an `image` file field. A previous image
/// is deleted once the new one is stored.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<RecipeImageResponse>> {
    let recipe = find_recipe(&state, user, id).await?;

    let mut data = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            data = Some(field.bytes().await?);
            break;
        }
    }

    let Some(data) = data.filter(|data| !data.is_empty()) else {
        return Err(ApiError::Validation(FieldErrors::single(IMAGE_FIELD, NO_FILE)));
    };
    let format = ImageFormat::detect(&data)
        .ok_or_else(|| ApiError::Validation(FieldErrors::single(IMAGE_FIELD, INVALID_IMAGE)))?;

    let path = state
        .media
        .save_recipe_image(format, &data)
        .await
        .map_err(|e| ApiError::internal("Failed to store recipe image", e))?;

    let updated = match state.recipes.set_image(user.id, id, Some(&path)).await {
        Ok(Some(updated)) => updated,
        outcome => {
            // nothing references the new file
            if let Err(e) = state.media.remove(&path).await {
                warn!("Failed to remove orphaned image {}: {}", path, e);
            }
            return Err(match outcome {
                Err(e) => ApiError::internal("Failed to attach recipe image", e),
                _ => ApiError::NotFound,
            });
        }
    };

    if let Some(previous) = recipe.image {
        if let Err(e) = state.media.remove(&previous).await {
            warn!("Failed to remove previous image of recipe {}: {}", id, e);
        }
    }

    info!("Stored image {} for recipe {}", path, id);
    Ok(Json(serializers::recipe_image_response(&updated, &state.media)))
}
