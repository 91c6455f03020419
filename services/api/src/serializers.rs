//! Serialization layer
//!
//! Turns client payloads into validated store inputs and store entities
//! into response shapes. Write payloads carry relation ids; the detail shape
//! expands them into nested `{id, name}` objects.

use uuid::Uuid;

use crate::access;
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::models::{
    Attribute, AttributeKind, AttributePayload, AttributeResponse, Price, Recipe,
    RecipeDetailResponse, RecipeFilter, RecipeImageResponse, RecipeInput, RecipePayload,
    RecipeQuery, RecipeResponse,
};
use crate::repositories::AttributeRepository;
use crate::storage::MediaStorage;

/// Maximum length of names, titles and links
pub const MAX_LENGTH: usize = 255;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";

fn too_long() -> String {
    format!(
        "Ensure this field has no more than {} characters.",
        MAX_LENGTH
    )
}

/// Trim a required text field, recording blank and length errors
fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    let Some(value) = value else {
        errors.add(field, REQUIRED);
        return None;
    };

    let value = value.trim();
    if value.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if value.chars().count() > MAX_LENGTH {
        errors.add(field, too_long());
        return None;
    }

    Some(value.to_string())
}

/// Validate the name of a tag or ingredient
pub fn validate_attribute(payload: &AttributePayload) -> ApiResult<String> {
    let mut errors = FieldErrors::new();
    let name = required_text(&mut errors, "name", payload.name.as_deref());

    match name {
        Some(name) if errors.is_empty() => Ok(name),
        _ => Err(ApiError::Validation(errors)),
    }
}

/// Interpret a boolean query flag such as `assigned_only`
///
/// Integers are truthy when non-zero; the usual words are accepted too.
pub fn parse_flag(field: &str, value: Option<&str>) -> ApiResult<bool> {
    let Some(value) = value.map(str::trim) else {
        return Ok(false);
    };

    if let Ok(number) = value.parse::<i64>() {
        return Ok(number != 0);
    }

    match value.to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "off" => Ok(false),
        "true" | "yes" | "on" => Ok(true),
        _ => Err(ApiError::Validation(FieldErrors::single(
            field,
            "Must be a valid boolean.",
        ))),
    }
}

/// Parse a comma separated id list such as `tags=1,2,3`
///
/// An empty value such as `tags=` yields `None`.
pub fn parse_id_list(field: &str, value: Option<&str>) -> ApiResult<Option<Vec<i64>>> {
    let Some(value) = value else {
        return Ok(None);
    };

    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|_| {
                ApiError::Validation(FieldErrors::single(
                    field,
                    format!("\"{}\" is not a valid id.", part),
                ))
            })
        })
        .collect::<ApiResult<Vec<i64>>>()
        // no ids means no filter
        .map(|ids| (!ids.is_empty()).then_some(ids))
}

/// Validate recipe list query parameters
pub fn recipe_filter(query: &RecipeQuery) -> ApiResult<RecipeFilter> {
    Ok(RecipeFilter {
        tag_ids: parse_id_list("tags", query.tags.as_deref())?,
        ingredient_ids: parse_id_list("ingredients", query.ingredients.as_deref())?,
    })
}

fn price_value(value: &serde_json::Value) -> Result<Price, String> {
    match value {
        serde_json::Value::Number(number) => Price::parse(&number.to_string()),
        serde_json::Value::String(text) => Price::parse(text),
        _ => Err("A valid number is required.".to_string()),
    }
}

fn minutes_value(value: &serde_json::Value) -> Result<i32, String> {
    let invalid = || "A valid integer is required.".to_string();

    let minutes = match value {
        serde_json::Value::Number(number) => match (number.as_i64(), number.as_f64()) {
            (Some(minutes), _) => minutes,
            (None, Some(minutes)) if minutes.fract() == 0.0 => minutes as i64,
            _ => return Err(invalid()),
        },
        serde_json::Value::String(text) => text.trim().parse::<i64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    if minutes < 0 {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }
    i32::try_from(minutes)
        .map_err(|_| format!("Ensure this value is less than or equal to {}.", i32::MAX))
}

/// Validate a recipe write payload
///
/// With `existing` set the payload is a partial update and absent fields
/// keep their current value; otherwise every field except `link` is
/// required, though `tags` and `ingredients` may be empty lists. Relation
/// ids are resolved against the owner's own tags and ingredients.
pub async fn deserialize_recipe(
    attributes: &dyn AttributeRepository,
    owner: Uuid,
    payload: RecipePayload,
    existing: Option<&Recipe>,
) -> ApiResult<RecipeInput> {
    let mut errors = FieldErrors::new();

    let title = match (&payload.title, existing) {
        (None, Some(recipe)) => Some(recipe.title.clone()),
        (title, _) => required_text(&mut errors, "title", title.as_deref()),
    };

    let time_minutes = match (&payload.time_minutes, existing) {
        (None, Some(recipe)) => Some(recipe.time_minutes),
        (None, None) => {
            errors.add("time_minutes", REQUIRED);
            None
        }
        (Some(value), _) => match minutes_value(value) {
            Ok(minutes) => Some(minutes),
            Err(message) => {
                errors.add("time_minutes", message);
                None
            }
        },
    };

    let price = match (&payload.price, existing) {
        (None, Some(recipe)) => Some(recipe.price),
        (None, None) => {
            errors.add("price", REQUIRED);
            None
        }
        (Some(value), _) => match price_value(value) {
            Ok(price) => Some(price),
            Err(message) => {
                errors.add("price", message);
                None
            }
        },
    };

    let link = match (payload.link, existing) {
        (None, Some(recipe)) => recipe.link.clone(),
        (None, None) => String::new(),
        (Some(link), _) => {
            let link = link.trim().to_string();
            if link.chars().count() > MAX_LENGTH {
                errors.add("link", too_long());
            }
            link
        }
    };

    let tag_ids = resolve_relations(
        attributes,
        owner,
        AttributeKind::Tag,
        payload.tags,
        existing.map(|recipe| recipe.tag_ids.as_slice()),
        &mut errors,
    )
    .await?;
    let ingredient_ids = resolve_relations(
        attributes,
        owner,
        AttributeKind::Ingredient,
        payload.ingredients,
        existing.map(|recipe| recipe.ingredient_ids.as_slice()),
        &mut errors,
    )
    .await?;

    match (title, time_minutes, price) {
        (Some(title), Some(time_minutes), Some(price)) if errors.is_empty() => Ok(RecipeInput {
            title,
            time_minutes,
            price,
            link,
            tag_ids,
            ingredient_ids,
        }),
        _ => Err(ApiError::Validation(errors)),
    }
}

/// Resolve requested relation ids, recording an error per rejected id
async fn resolve_relations(
    attributes: &dyn AttributeRepository,
    owner: Uuid,
    kind: AttributeKind,
    requested: Option<Vec<i64>>,
    current: Option<&[i64]>,
    errors: &mut FieldErrors,
) -> ApiResult<Vec<i64>> {
    let Some(requested) = requested else {
        return match current {
            Some(current) => Ok(current.to_vec()),
            None => {
                errors.add(kind.field(), REQUIRED);
                Ok(Vec::new())
            }
        };
    };

    let resolution = access::resolve_owned(attributes, owner, kind, &requested)
        .await
        .map_err(|e| ApiError::internal("Failed to resolve recipe relations", e))?;

    for id in resolution.rejected {
        errors.add(
            kind.field(),
            format!("Invalid pk \"{}\" - object does not exist.", id),
        );
    }

    Ok(resolution.ids)
}

/// List shape of a recipe
pub fn recipe_response(recipe: Recipe, media: &MediaStorage) -> RecipeResponse {
    RecipeResponse {
        id: recipe.id,
        user: recipe.user_id,
        title: recipe.title,
        ingredients: recipe.ingredient_ids,
        tags: recipe.tag_ids,
        time_minutes: recipe.time_minutes,
        price: recipe.price,
        link: recipe.link,
        image: recipe.image.as_deref().map(|path| media.url(path)),
    }
}

/// Detail shape of a recipe with its resolved tags and ingredients
pub fn recipe_detail_response(
    recipe: Recipe,
    tags: Vec<Attribute>,
    ingredients: Vec<Attribute>,
    media: &MediaStorage,
) -> RecipeDetailResponse {
    RecipeDetailResponse {
        id: recipe.id,
        user: recipe.user_id,
        title: recipe.title,
        ingredients: ingredients.into_iter().map(AttributeResponse::from).collect(),
        tags: tags.into_iter().map(AttributeResponse::from).collect(),
        time_minutes: recipe.time_minutes,
        price: recipe.price,
        link: recipe.link,
        image: recipe.image.as_deref().map(|path| media.url(path)),
    }
}

/// Image shape of a recipe
pub fn recipe_image_response(recipe: &Recipe, media: &MediaStorage) -> RecipeImageResponse {
    RecipeImageResponse {
        id: recipe.id,
        image: recipe.image.as_deref().map(|path| media.url(path)),
    }
}
