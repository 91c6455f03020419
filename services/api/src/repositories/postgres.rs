//! PostgreSQL-backed repositories

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use super::{AttributeRepository, RecipeRepository};
use crate::models::{
    Attribute, AttributeFilter, AttributeKind, Price, Recipe, RecipeFilter, RecipeInput,
};

/// Repository over the shared PostgreSQL pool
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Create a new repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Relation ids per recipe for the given recipes
    async fn relation_ids(
        &self,
        kind: AttributeKind,
        recipe_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<i64>>> {
        let sql = format!(
            "SELECT recipe_id, {column} FROM {join} WHERE recipe_id = ANY($1) ORDER BY {column}",
            column = kind.join_column(),
            join = kind.join_table(),
        );

        let rows: Vec<(i64, i64)> = sqlx::query_as(&sql)
            .bind(recipe_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut relations: HashMap<i64, Vec<i64>> = HashMap::new();
        for (recipe_id, attribute_id) in rows {
            relations.entry(recipe_id).or_default().push(attribute_id);
        }

        Ok(relations)
    }

    async fn with_relations(&self, rows: Vec<RecipeRow>) -> Result<Vec<Recipe>> {
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut tags = self.relation_ids(AttributeKind::Tag, &ids).await?;
        let mut ingredients = self.relation_ids(AttributeKind::Ingredient, &ids).await?;

        rows.into_iter()
            .map(|row| {
                let tag_ids = tags.remove(&row.id).unwrap_or_default();
                let ingredient_ids = ingredients.remove(&row.id).unwrap_or_default();
                row.into_recipe(tag_ids, ingredient_ids)
            })
            .collect()
    }

    /// Replace the relation rows of a recipe inside a transaction
    ///
    /// Only attributes owned by `owner` are linked.
    async fn replace_relations(
        tx: &mut Transaction<'_, Postgres>,
        owner: Uuid,
        kind: AttributeKind,
        recipe_id: i64,
        ids: &[i64],
    ) -> Result<()> {
        sqlx::query(&format!(
            "DELETE FROM {} WHERE recipe_id = $1",
            kind.join_table()
        ))
        .bind(recipe_id)
        .execute(&mut **tx)
        .await?;

        if ids.is_empty() {
            return Ok(());
        }

        sqlx::query(&format!(
            r#"
            INSERT INTO {join} (recipe_id, {column})
            SELECT $1, a.id FROM {table} a
            WHERE a.id = ANY($2) AND a.user_id = $3
            ON CONFLICT DO NOTHING
            "#,
            join = kind.join_table(),
            column = kind.join_column(),
            table = kind.table(),
        ))
        .bind(recipe_id)
        .bind(ids)
        .bind(owner)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[derive(FromRow)]
struct RecipeRow {
    id: i64,
    user_id: Uuid,
    title: String,
    time_minutes: i32,
    price_cents: i64,
    link: String,
    image: Option<String>,
}

impl RecipeRow {
    fn into_recipe(self, tag_ids: Vec<i64>, ingredient_ids: Vec<i64>) -> Result<Recipe> {
        let price = Price::from_cents(self.price_cents).ok_or_else(|| {
            anyhow::anyhow!(
                "Recipe {} has an out of range price: {}",
                self.id,
                self.price_cents
            )
        })?;

        Ok(Recipe {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            time_minutes: self.time_minutes,
            price,
            link: self.link,
            image: self.image,
            tag_ids,
            ingredient_ids,
        })
    }
}

#[async_trait]
impl AttributeRepository for PgRepository {
    async fn list(
        &self,
        owner: Uuid,
        kind: AttributeKind,
        filter: AttributeFilter,
    ) -> Result<Vec<Attribute>> {
        let assigned = if filter.assigned_only {
            format!(
                r#"
                AND EXISTS (
                    SELECT 1 FROM {join} j
                    JOIN recipes r ON r.id = j.recipe_id
                    WHERE j.{column} = a.id AND r.user_id = $1
                )
                "#,
                join = kind.join_table(),
                column = kind.join_column(),
            )
        } else {
            String::new()
        };

        let sql = format!(
            r#"
            SELECT a.id, a.name, a.user_id
            FROM {table} a
            WHERE a.user_id = $1 {assigned}
            ORDER BY a.name COLLATE "C" DESC, a.id DESC
            "#,
            table = kind.table(),
        );

        let attributes = sqlx::query_as::<_, Attribute>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        Ok(attributes)
    }

    async fn get(&self, owner: Uuid, kind: AttributeKind, id: i64) -> Result<Option<Attribute>> {
        let sql = format!(
            "SELECT id, name, user_id FROM {} WHERE id = $1 AND user_id = $2",
            kind.table()
        );

        let attribute = sqlx::query_as::<_, Attribute>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        Ok(attribute)
    }

    async fn find_by_ids(
        &self,
        owner: Uuid,
        kind: AttributeKind,
        ids: &[i64],
    ) -> Result<Vec<Attribute>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, name, user_id FROM {} WHERE user_id = $1 AND id = ANY($2) ORDER BY id",
            kind.table()
        );

        let attributes = sqlx::query_as::<_, Attribute>(&sql)
            .bind(owner)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(attributes)
    }

    async fn create(&self, owner: Uuid, kind: AttributeKind, name: &str) -> Result<Attribute> {
        let sql = format!(
            "INSERT INTO {} (name, user_id) VALUES ($1, $2) RETURNING id, name, user_id",
            kind.table()
        );

        let attribute = sqlx::query_as::<_, Attribute>(&sql)
            .bind(name)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;

        info!("Created {} {} for user {}", kind.table(), attribute.id, owner);
        Ok(attribute)
    }

    async fn rename(
        &self,
        owner: Uuid,
        kind: AttributeKind,
        id: i64,
        name: &str,
    ) -> Result<Option<Attribute>> {
        let sql = format!(
            "UPDATE {} SET name = $1 WHERE id = $2 AND user_id = $3 RETURNING id, name, user_id",
            kind.table()
        );

        let attribute = sqlx::query_as::<_, Attribute>(&sql)
            .bind(name)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        Ok(attribute)
    }

    async fn delete(&self, owner: Uuid, kind: AttributeKind, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", kind.table());

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RecipeRepository for PgRepository {
    async fn list(&self, owner: Uuid, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT r.id, r.user_id, r.title, r.time_minutes, r.price_cents, r.link, r.image
            FROM recipes r
            WHERE r.user_id = $1
              AND ($2::BIGINT[] IS NULL OR EXISTS (
                  SELECT 1 FROM recipe_tags rt
                  WHERE rt.recipe_id = r.id AND rt.tag_id = ANY($2)
              ))
              AND ($3::BIGINT[] IS NULL OR EXISTS (
                  SELECT 1 FROM recipe_ingredients ri
                  WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY($3)
              ))
            ORDER BY r.id DESC
            "#,
        )
        .bind(owner)
        .bind(filter.tag_ids.as_deref())
        .bind(filter.ingredient_ids.as_deref())
        .fetch_all(&self.pool)
        .await?;

        self.with_relations(rows).await
    }

    async fn get(&self, owner: Uuid, id: i64) -> Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT id, user_id, title, time_minutes, price_cents, link, image
            FROM recipes
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_relations(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create(&self, owner: Uuid, input: &RecipeInput) -> Result<Recipe> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO recipes (user_id, title, time_minutes, price_cents, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(owner)
        .bind(&input.title)
        .bind(input.time_minutes)
        .bind(input.price.cents())
        .bind(&input.link)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_relations(&mut tx, owner, AttributeKind::Tag, id, &input.tag_ids).await?;
        Self::replace_relations(
            &mut tx,
            owner,
            AttributeKind::Ingredient,
            id,
            &input.ingredient_ids,
        )
        .await?;

        tx.commit().await?;
        info!("Created recipe {} for user {}", id, owner);

        RecipeRepository::get(self, owner, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Recipe {} vanished after creation", id))
    }

    async fn update(&self, owner: Uuid, id: i64, input: &RecipeInput) -> Result<Option<Recipe>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE recipes
            SET title = $1, time_minutes = $2, price_cents = $3, link = $4
            WHERE id = $5 AND user_id = $6
            "#,
        )
        .bind(&input.title)
        .bind(input.time_minutes)
        .bind(input.price.cents())
        .bind(&input.link)
        .bind(id)
        .bind(owner)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        Self::replace_relations(&mut tx, owner, AttributeKind::Tag, id, &input.tag_ids).await?;
        Self::replace_relations(
            &mut tx,
            owner,
            AttributeKind::Ingredient,
            id,
            &input.ingredient_ids,
        )
        .await?;

        tx.commit().await?;

        RecipeRepository::get(self, owner, id).await
    }

    async fn delete(&self, owner: Uuid, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_image(
        &self,
        owner: Uuid,
        id: i64,
        image: Option<&str>,
    ) -> Result<Option<Recipe>> {
        let updated = sqlx::query("UPDATE recipes SET image = $1 WHERE id = $2 AND user_id = $3")
            .bind(image)
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        RecipeRepository::get(self, owner, id).await
    }
}
