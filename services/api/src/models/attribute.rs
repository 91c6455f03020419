//! Tag and ingredient models
//!
//! Tags and ingredients share the same shape (`id`, `name`, owner) and the
//! same behaviour, so both are handled as "attributes" distinguished by an
//! [`AttributeKind`].

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Which attribute collection an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Tag,
    Ingredient,
}

impl AttributeKind {
    /// Table holding the attribute rows
    pub fn table(self) -> &'static str {
        match self {
            AttributeKind::Tag => "tags",
            AttributeKind::Ingredient => "ingredients",
        }
    }

    /// Join table linking recipes to this attribute
    pub fn join_table(self) -> &'static str {
        match self {
            AttributeKind::Tag => "recipe_tags",
            AttributeKind::Ingredient => "recipe_ingredients",
        }
    }

    /// Column of the join table referencing the attribute
    pub fn join_column(self) -> &'static str {
        match self {
            AttributeKind::Tag => "tag_id",
            AttributeKind::Ingredient => "ingredient_id",
        }
    }

    /// Name of the recipe field holding this attribute
    pub fn field(self) -> &'static str {
        match self {
            AttributeKind::Tag => "tags",
            AttributeKind::Ingredient => "ingredients",
        }
    }
}

/// Tag or ingredient entity
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Attribute {
    pub id: i64,
    pub name: String,
    pub user_id: Uuid,
}

/// Read shape of a tag or ingredient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeResponse {
    pub id: i64,
    pub name: String,
}

impl From<Attribute> for AttributeResponse {
    fn from(attribute: Attribute) -> Self {
        AttributeResponse {
            id: attribute.id,
            name: attribute.name,
        }
    }
}

/// Create/update payload for a tag or ingredient
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributePayload {
    pub name: Option<String>,
}

/// Query parameters for tag and ingredient listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeQuery {
    /// Only return items assigned to at least one recipe
    pub assigned_only: Option<String>,
}

/// Validated listing options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeFilter {
    pub assigned_only: bool,
}
