//! Recipe models for the API service

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{attribute::AttributeResponse, price::Price};

/// Recipe entity with its relation ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    /// Path of the stored image, relative to the media root
    pub image: Option<String>,
    pub tag_ids: Vec<i64>,
    pub ingredient_ids: Vec<i64>,
}

/// Validated recipe fields, ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeInput {
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub tag_ids: Vec<i64>,
    pub ingredient_ids: Vec<i64>,
}

/// Write payload for recipes
///
/// Every field is optional so that PATCH can send any subset; the
/// serialization layer decides which ones are required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePayload {
    pub title: Option<String>,
    /// Integer or integer string
    pub time_minutes: Option<serde_json::Value>,
    /// Number or decimal string
    pub price: Option<serde_json::Value>,
    pub link: Option<String>,
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

/// List shape of a recipe, relations as ids
#[derive(Debug, Clone, Serialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub user: Uuid,
    pub title: String,
    pub ingredients: Vec<i64>,
    pub tags: Vec<i64>,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub image: Option<String>,
}

/// Detail shape of a recipe, relations expanded
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetailResponse {
    pub id: i64,
    pub user: Uuid,
    pub title: String,
    pub ingredients: Vec<AttributeResponse>,
    pub tags: Vec<AttributeResponse>,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub image: Option<String>,
}

/// Response of the image upload action
#[derive(Debug, Clone, Serialize)]
pub struct RecipeImageResponse {
    pub id: i64,
    pub image: Option<String>,
}

/// Query parameters for recipe listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeQuery {
    /// Comma separated tag ids
    pub tags: Option<String>,
    /// Comma separated ingredient ids
    pub ingredients: Option<String>,
}

/// Validated recipe listing options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tag_ids: Option<Vec<i64>>,
    pub ingredient_ids: Option<Vec<i64>>,
}
