//! In-memory repositories
//!
//! Used for local development without a database and by the router tests.
//! Semantics match the PostgreSQL implementation, including byte-wise name
//! ordering and cascading removal of relations when an attribute is deleted.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AttributeRepository, RecipeRepository};
use crate::access;
use crate::models::{Attribute, AttributeFilter, AttributeKind, Recipe, RecipeFilter, RecipeInput};

struct Table<T> {
    last_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
struct MemoryState {
    tags: Table<Attribute>,
    ingredients: Table<Attribute>,
    recipes: Table<Recipe>,
}

impl MemoryState {
    fn attributes(&self, kind: AttributeKind) -> &Table<Attribute> {
        match kind {
            AttributeKind::Tag => &self.tags,
            AttributeKind::Ingredient => &self.ingredients,
        }
    }

    fn attributes_mut(&mut self, kind: AttributeKind) -> &mut Table<Attribute> {
        match kind {
            AttributeKind::Tag => &mut self.tags,
            AttributeKind::Ingredient => &mut self.ingredients,
        }
    }

    /// Keep only ids of attributes owned by `owner`, sorted and unique
    fn owned_ids(&self, owner: Uuid, kind: AttributeKind, ids: &[i64]) -> Vec<i64> {
        let table = &self.attributes(kind).rows;
        ids.iter()
            .filter(|id| table.get(id).is_some_and(|a| a.user_id == owner))
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn relation_ids(recipe: &Recipe, kind: AttributeKind) -> &[i64] {
    match kind {
        AttributeKind::Tag => &recipe.tag_ids,
        AttributeKind::Ingredient => &recipe.ingredient_ids,
    }
}

fn matches_any(ids: &[i64], wanted: Option<&[i64]>) -> bool {
    wanted.is_none_or(|wanted| ids.iter().any(|id| wanted.contains(id)))
}

/// Repository keeping every table in process memory
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttributeRepository for InMemoryRepository {
    async fn list(
        &self,
        owner: Uuid,
        kind: AttributeKind,
        filter: AttributeFilter,
    ) -> Result<Vec<Attribute>> {
        let state = self.state.read().await;

        let assigned: Option<BTreeSet<i64>> = filter.assigned_only.then(|| {
            access::scope_to_owner(owner, state.recipes.rows.values())
                .flat_map(|recipe| relation_ids(recipe, kind).iter().copied())
                .collect()
        });

        let mut attributes: Vec<Attribute> =
            access::scope_to_owner(owner, state.attributes(kind).rows.values())
                .filter(|a| assigned.as_ref().is_none_or(|ids| ids.contains(&a.id)))
                .cloned()
                .collect();

        attributes.sort_by(|a, b| b.name.cmp(&a.name).then(b.id.cmp(&a.id)));
        Ok(attributes)
    }

    async fn get(&self, owner: Uuid, kind: AttributeKind, id: i64) -> Result<Option<Attribute>> {
        let state = self.state.read().await;
        Ok(state
            .attributes(kind)
            .rows
            .get(&id)
            .filter(|a| a.user_id == owner)
            .cloned())
    }

    async fn find_by_ids(
        &self,
        owner: Uuid,
        kind: AttributeKind,
        ids: &[i64],
    ) -> Result<Vec<Attribute>> {
        let state = self.state.read().await;
        let table = &state.attributes(kind).rows;

        Ok(state
            .owned_ids(owner, kind, ids)
            .into_iter()
            .filter_map(|id| table.get(&id).cloned())
            .collect())
    }

    async fn create(&self, owner: Uuid, kind: AttributeKind, name: &str) -> Result<Attribute> {
        let mut state = self.state.write().await;
        let table = state.attributes_mut(kind);

        let attribute = Attribute {
            id: table.next_id(),
            name: name.to_string(),
            user_id: owner,
        };
        table.rows.insert(attribute.id, attribute.clone());

        Ok(attribute)
    }

    async fn rename(
        &self,
        owner: Uuid,
        kind: AttributeKind,
        id: i64,
        name: &str,
    ) -> Result<Option<Attribute>> {
        let mut state = self.state.write().await;

        Ok(state
            .attributes_mut(kind)
            .rows
            .get_mut(&id)
            .filter(|a| a.user_id == owner)
            .map(|attribute| {
                attribute.name = name.to_string();
                attribute.clone()
            }))
    }

    async fn delete(&self, owner: Uuid, kind: AttributeKind, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;

        let table = state.attributes_mut(kind);
        if !table.rows.get(&id).is_some_and(|a| a.user_id == owner) {
            return Ok(false);
        }
        table.rows.remove(&id);

        for recipe in state.recipes.rows.values_mut() {
            match kind {
                AttributeKind::Tag => recipe.tag_ids.retain(|tag| *tag != id),
                AttributeKind::Ingredient => recipe.ingredient_ids.retain(|i| *i != id),
            }
        }

        Ok(true)
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRepository {
    async fn list(&self, owner: Uuid, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        let state = self.state.read().await;

        let mut recipes: Vec<Recipe> = access::scope_to_owner(owner, state.recipes.rows.values())
            .filter(|recipe| matches_any(&recipe.tag_ids, filter.tag_ids.as_deref()))
            .filter(|recipe| {
                matches_any(&recipe.ingredient_ids, filter.ingredient_ids.as_deref())
            })
            .cloned()
            .collect();

        recipes.reverse();
        Ok(recipes)
    }

    async fn get(&self, owner: Uuid, id: i64) -> Result<Option<Recipe>> {
        let state = self.state.read().await;
        Ok(state
            .recipes
            .rows
            .get(&id)
            .filter(|recipe| recipe.user_id == owner)
            .cloned())
    }

    async fn create(&self, owner: Uuid, input: &RecipeInput) -> Result<Recipe> {
        let mut state = self.state.write().await;

        let tag_ids = state.owned_ids(owner, AttributeKind::Tag, &input.tag_ids);
        let ingredient_ids =
            state.owned_ids(owner, AttributeKind::Ingredient, &input.ingredient_ids);

        let recipe = Recipe {
            id: state.recipes.next_id(),
            user_id: owner,
            title: input.title.clone(),
            time_minutes: input.time_minutes,
            price: input.price,
            link: input.link.clone(),
            image: None,
            tag_ids,
            ingredient_ids,
        };
        state.recipes.rows.insert(recipe.id, recipe.clone());

        Ok(recipe)
    }

    async fn update(&self, owner: Uuid, id: i64, input: &RecipeInput) -> Result<Option<Recipe>> {
        let mut state = self.state.write().await;

        let tag_ids = state.owned_ids(owner, AttributeKind::Tag, &input.tag_ids);
        let ingredient_ids =
            state.owned_ids(owner, AttributeKind::Ingredient, &input.ingredient_ids);

        Ok(state
            .recipes
            .rows
            .get_mut(&id)
            .filter(|recipe| recipe.user_id == owner)
            .map(|recipe| {
                recipe.title = input.title.clone();
                recipe.time_minutes = input.time_minutes;
                recipe.price = input.price;
                recipe.link = input.link.clone();
                recipe.tag_ids = tag_ids;
                recipe.ingredient_ids = ingredient_ids;
                recipe.clone()
            }))
    }

    async fn delete(&self, owner: Uuid, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;

        if !state
            .recipes
            .rows
            .get(&id)
            .is_some_and(|recipe| recipe.user_id == owner)
        {
            return Ok(false);
        }

        Ok(state.recipes.rows.remove(&id).is_some())
    }

    async fn set_image(
        &self,
        owner: Uuid,
        id: i64,
        image: Option<&str>,
    ) -> Result<Option<Recipe>> {
        let mut state = self.state.write().await;

        Ok(state
            .recipes
            .rows
            .get_mut(&id)
            .filter(|recipe| recipe.user_id == owner)
            .map(|recipe| {
                recipe.image = image.map(str::to_string);
                recipe.clone()
            }))
    }
}
