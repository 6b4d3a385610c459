use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

use super::{schema, ItemStore, RecipeStore, Store, StoreError};
use crate::models::{ItemUpdate, NewItem, Recipe, RecipeInput, ShoppingListItem, DEFAULT_QUANTITY};

/// PostgreSQL-backed store. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  /// Build a pool without touching the network. Connections are opened on
  /// first use, so a database that is still starting does not fail startup.
  pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
    Self::connect_lazy_with_timeout(database_url, max_connections, Duration::from_secs(5))
  }

  /// As [`PgStore::connect_lazy`], bounding how long one probe or query may
  /// wait for a connection.
  fn connect_lazy_with_timeout(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
  ) -> Result<Self, StoreError> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .acquire_timeout(acquire_timeout)
      .connect_lazy(database_url)?;

    Ok(Self { pool })
  }

  /// Probe the database up to `attempts` times, sleeping `delay` between
  /// tries. Returns whether a probe succeeded. Never fails the caller.
  pub async fn wait_until_ready(&self, attempts: u32, delay: Duration) -> bool {
    retry_probe(attempts, delay, || self.now()).await
  }

  /// Create tables and indexes if they do not exist yet.
  pub async fn run_migrations(&self) -> Result<(), StoreError> {
    sqlx::raw_sql(schema::SCHEMA).execute(&self.pool).await?;
    Ok(())
  }
}

/// Run `probe` until it succeeds, at most `attempts` times (at least once),
/// with a fixed `delay` between tries.
async fn retry_probe<F, Fut>(attempts: u32, delay: Duration, mut probe: F) -> bool
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<DateTime<Utc>, StoreError>>,
{
  for attempt in 1..=attempts.max(1) {
    match probe().await {
      Ok(time) => {
        info!(%time, "Database connected");
        return true;
      }
      Err(e) => {
        error!(error = %e, "Database connection error");
        if attempt < attempts {
          warn!("Retrying database connection ({}/{})...", attempt, attempts);
          tokio::time::sleep(delay).await;
        }
      }
    }
  }

  error!("Max retries reached. Could not connect to database.");
  false
}

#[async_trait]
impl ItemStore for PgStore {
  async fn list_items(&self) -> Result<Vec<ShoppingListItem>, StoreError> {
    let items = sqlx::query_as::<_, ShoppingListItem>(
      r#"
      SELECT id, name, quantity, unit, checked, created_at
      FROM shopping_list_items
      ORDER BY created_at DESC, id DESC
      "#,
    )
    .fetch_all(&self.pool)
    .await?;
    Ok(items)
  }

  async fn create_item(&self, item: NewItem) -> Result<ShoppingListItem, StoreError> {
    let rec = sqlx::query_as::<_, ShoppingListItem>(
      r#"
      INSERT INTO shopping_list_items (name, quantity, unit, checked)
      VALUES ($1, $2, $3, $4)
      RETURNING id, name, quantity, unit, checked, created_at
      "#,
    )
    .bind(item.name)
    .bind(item.quantity.unwrap_or_else(|| DEFAULT_QUANTITY.to_string()))
    .bind(item.unit.unwrap_or_default())
    .bind(item.checked.unwrap_or(false))
    .fetch_one(&self.pool)
    .await?;
    Ok(rec)
  }

  async fn update_item(
    &self,
    id: i32,
    update: ItemUpdate,
  ) -> Result<Option<ShoppingListItem>, StoreError> {
    let rec = sqlx::query_as::<_, ShoppingListItem>(
      r#"
      UPDATE shopping_list_items
      SET name = $1, quantity = $2, unit = $3, checked = $4
      WHERE id = $5
      RETURNING id, name, quantity, unit, checked, created_at
      "#,
    )
    .bind(update.name)
    .bind(update.quantity)
    .bind(update.unit)
    .bind(update.checked)
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(rec)
  }

  async fn delete_item(&self, id: i32) -> Result<bool, StoreError> {
    let res = sqlx::query("DELETE FROM shopping_list_items WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(res.rows_affected() > 0)
  }

  async fn delete_checked_items(&self) -> Result<u64, StoreError> {
    let res = sqlx::query("DELETE FROM shopping_list_items WHERE checked = true")
      .execute(&self.pool)
      .await?;
    Ok(res.rows_affected())
  }
}

#[async_trait]
impl RecipeStore for PgStore {
  async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
    let recipes = sqlx::query_as::<_, Recipe>(
      r#"
      SELECT id, title, ingredients, instructions, cooking_time, servings, thumbnail_uri, created_at
      FROM recipes
      ORDER BY id
      "#,
    )
    .fetch_all(&self.pool)
    .await?;
    Ok(recipes)
  }

  async fn get_recipe(&self, id: i32) -> Result<Option<Recipe>, StoreError> {
    let recipe = sqlx::query_as::<_, Recipe>(
      r#"
      SELECT id, title, ingredients, instructions, cooking_time, servings, thumbnail_uri, created_at
      FROM recipes
      WHERE id = $1
      "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(recipe)
  }

  async fn create_recipe(&self, input: RecipeInput) -> Result<Recipe, StoreError> {
    let rec = sqlx::query_as::<_, Recipe>(
      r#"
      INSERT INTO recipes (title, ingredients, instructions, cooking_time, servings, thumbnail_uri)
      VALUES ($1, $2, $3, $4, $5, $6)
      RETURNING id, title, ingredients, instructions, cooking_time, servings, thumbnail_uri, created_at
      "#,
    )
    .bind(input.title)
    .bind(input.ingredients)
    .bind(input.instructions)
    .bind(input.cooking_time)
    .bind(input.servings)
    .bind(input.thumbnail_uri)
    .fetch_one(&self.pool)
    .await?;
    Ok(rec)
  }

  async fn update_recipe(&self, id: i32, input: RecipeInput) -> Result<Option<Recipe>, StoreError> {
    let rec = sqlx::query_as::<_, Recipe>(
      r#"
      UPDATE recipes
      SET title = $1, ingredients = $2, instructions = $3, cooking_time = $4, servings = $5,
          thumbnail_uri = $6
      WHERE id = $7
      RETURNING id, title, ingredients, instructions, cooking_time, servings, thumbnail_uri, created_at
      "#,
    )
    .bind(input.title)
    .bind(input.ingredients)
    .bind(input.instructions)
    .bind(input.cooking_time)
    .bind(input.servings)
    .bind(input.thumbnail_uri)
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(rec)
  }

  async fn delete_recipe(&self, id: i32) -> Result<bool, StoreError> {
    let res = sqlx::query("DELETE FROM recipes WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(res.rows_affected() > 0)
  }
}

#[async_trait]
impl Store for PgStore {
  async fn now(&self) -> Result<DateTime<Utc>, StoreError> {
    let time = sqlx::query_scalar::<_, DateTime<Utc>>("SELECT now()")
      .fetch_one(&self.pool)
      .await?;
    Ok(time)
  }
}
