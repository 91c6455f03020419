//! API models for entities, request payloads and response shapes

pub mod attribute;
pub mod price;
pub mod recipe;

pub use attribute::{
    Attribute, AttributeFilter, AttributeKind, AttributePayload, AttributeQuery,
    AttributeResponse,
};
pub use price::Price;
pub use recipe::{
    Recipe, RecipeDetailResponse, RecipeFilter, RecipeImageResponse, RecipeInput, RecipePayload,
    RecipeQuery, RecipeResponse,
};
