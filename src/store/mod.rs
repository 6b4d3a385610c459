//! Server-side persistence for shopping list items and recipes.
//!
//! Every mutating operation is one atomic statement against a single table,
//! so no application-level locking or transactions are needed.

mod memory;
mod postgres;
mod schema;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{ItemUpdate, NewItem, Recipe, RecipeInput, ShoppingListItem};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
  #[error("Store lock poisoned")]
  Poisoned,
}

/// Shopping list operations
#[async_trait]
pub trait ItemStore: Send + Sync {
  /// All items, newest first.
  async fn list_items(&self) -> Result<Vec<ShoppingListItem>, StoreError>;

  /// Persist a new item. Omitted fields take their column defaults.
  async fn create_item(&self, item: NewItem) -> Result<ShoppingListItem, StoreError>;

  /// Overwrite an item's fields. `None` when no row has that id.
  async fn update_item(
    &self,
    id: i32,
    update: ItemUpdate,
  ) -> Result<Option<ShoppingListItem>, StoreError>;

  /// Returns whether a row was removed.
  async fn delete_item(&self, id: i32) -> Result<bool, StoreError>;

  /// Remove every checked item, returning how many went.
  async fn delete_checked_items(&self) -> Result<u64, StoreError>;
}

/// Recipe operations
#[async_trait]
pub trait RecipeStore: Send + Sync {
  async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError>;

  async fn get_recipe(&self, id: i32) -> Result<Option<Recipe>, StoreError>;

  async fn create_recipe(&self, input: RecipeInput) -> Result<Recipe, StoreError>;

  async fn update_recipe(&self, id: i32, input: RecipeInput) -> Result<Option<Recipe>, StoreError>;

  async fn delete_recipe(&self, id: i32) -> Result<bool, StoreError>;
}

/// A complete backing store for the API server
#[async_trait]
pub trait Store: ItemStore + RecipeStore {
  /// Round trip to the store, returning its clock.
  async fn now(&self) -> Result<DateTime<Utc>, StoreError>;
}
