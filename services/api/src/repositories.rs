//! Repositories for database operations
//!
//! Every operation takes the owner explicitly: implementations must only
//! ever read or write rows belonging to that user. Items owned by someone
//! else behave exactly like items that do not exist.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Attribute, AttributeFilter, AttributeKind, Recipe, RecipeFilter, RecipeInput};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

/// Data access for tags and ingredients
#[async_trait]
pub trait AttributeRepository: Send + Sync {
    /// List the owner's attributes, name descending
    async fn list(
        &self,
        owner: Uuid,
        kind: AttributeKind,
        filter: AttributeFilter,
    ) -> Result<Vec<Attribute>>;

    /// Find one of the owner's attributes
    async fn get(&self, owner: Uuid, kind: AttributeKind, id: i64) -> Result<Option<Attribute>>;

    /// Resolve ids against the owner's attributes, ordered by id
    ///
    /// Ids that are unknown or owned by another user are left out.
    async fn find_by_ids(
        &self,
        owner: Uuid,
        kind: AttributeKind,
        ids: &[i64],
    ) -> Result<Vec<Attribute>>;

    /// Create an attribute for the owner
    async fn create(&self, owner: Uuid, kind: AttributeKind, name: &str) -> Result<Attribute>;

    /// Rename one of the owner's attributes
    async fn rename(
        &self,
        owner: Uuid,
        kind: AttributeKind,
        id: i64,
        name: &str,
    ) -> Result<Option<Attribute>>;

    /// Delete one of the owner's attributes, detaching it from recipes
    async fn delete(&self, owner: Uuid, kind: AttributeKind, id: i64) -> Result<bool>;
}

/// Data access for recipes
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// List the owner's recipes, newest first
    async fn list(&self, owner: Uuid, filter: &RecipeFilter) -> Result<Vec<Recipe>>;

    /// Find one of the owner's recipes
    async fn get(&self, owner: Uuid, id: i64) -> Result<Option<Recipe>>;

    /// Create a recipe for the owner
    async fn create(&self, owner: Uuid, input: &RecipeInput) -> Result<Recipe>;

    /// Replace the fields and relations of one of the owner's recipes
    async fn update(&self, owner: Uuid, id: i64, input: &RecipeInput) -> Result<Option<Recipe>>;

    /// Delete one of the owner's recipes
    async fn delete(&self, owner: Uuid, id: i64) -> Result<bool>;

    /// Set or clear the stored image path of one of the owner's recipes
    async fn set_image(
        &self,
        owner: Uuid,
        id: i64,
        image: Option<&str>,
    ) -> Result<Option<Recipe>>;
}
