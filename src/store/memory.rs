use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

use super::{ItemStore, RecipeStore, Store, StoreError};
use crate::models::{ItemUpdate, NewItem, Recipe, RecipeInput, ShoppingListItem, DEFAULT_QUANTITY};

/// Process-local store. Data is lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
  items: Vec<ShoppingListItem>,
  recipes: Vec<Recipe>,
  last_item_id: i32,
  last_recipe_id: i32,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
    self.tables.lock().map_err(|_| StoreError::Poisoned)
  }
}

#[async_trait]
impl ItemStore for MemoryStore {
  async fn list_items(&self) -> Result<Vec<ShoppingListItem>, StoreError> {
    let tables = self.lock()?;
    let mut items = tables.items.clone();
    items.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    Ok(items)
  }

  async fn create_item(&self, item: NewItem) -> Result<ShoppingListItem, StoreError> {
    let mut tables = self.lock()?;
    tables.last_item_id += 1;

    let rec = ShoppingListItem {
      id: tables.last_item_id,
      name: item.name,
      quantity: item.quantity.unwrap_or_else(|| DEFAULT_QUANTITY.to_string()),
      unit: item.unit.unwrap_or_default(),
      checked: item.checked.unwrap_or(false),
      created_at: Some(Utc::now()),
    };
    tables.items.push(rec.clone());
    Ok(rec)
  }

  async fn update_item(
    &self,
    id: i32,
    update: ItemUpdate,
  ) -> Result<Option<ShoppingListItem>, StoreError> {
    let mut tables = self.lock()?;
    let Some(existing) = tables.items.iter_mut().find(|i| i.id == id) else {
      return Ok(None);
    };

    existing.name = update.name;
    existing.quantity = update.quantity;
    existing.unit = update.unit;
    existing.checked = update.checked;
    Ok(Some(existing.clone()))
  }

  async fn delete_item(&self, id: i32) -> Result<bool, StoreError> {
    let mut tables = self.lock()?;
    let before = tables.items.len();
    tables.items.retain(|i| i.id != id);
    Ok(tables.items.len() < before)
  }

  async fn delete_checked_items(&self) -> Result<u64, StoreError> {
    let mut tables = self.lock()?;
    let before = tables.items.len();
    tables.items.retain(|i| !i.checked);
    Ok((before - tables.items.len()) as u64)
  }
}

#[async_trait]
impl RecipeStore for MemoryStore {
  async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
    Ok(self.lock()?.recipes.clone())
  }

  async fn get_recipe(&self, id: i32) -> Result<Option<Recipe>, StoreError> {
    Ok(self.lock()?.recipes.iter().find(|r| r.id == id).cloned())
  }

  async fn create_recipe(&self, input: RecipeInput) -> Result<Recipe, StoreError> {
    let mut tables = self.lock()?;
    tables.last_recipe_id += 1;

    let rec = Recipe {
      id: tables.last_recipe_id,
      title: input.title,
      ingredients: input.ingredients,
      instructions: input.instructions,
      cooking_time: input.cooking_time,
      servings: input.servings,
      thumbnail_uri: input.thumbnail_uri,
      created_at: Some(Utc::now()),
    };
    tables.recipes.push(rec.clone());
    Ok(rec)
  }

  async fn update_recipe(&self, id: i32, input: RecipeInput) -> Result<Option<Recipe>, StoreError> {
    let mut tables = self.lock()?;
    let Some(existing) = tables.recipes.iter_mut().find(|r| r.id == id) else {
      return Ok(None);
    };

    existing.title = input.title;
    existing.ingredients = input.ingredients;
    existing.instructions = input.instructions;
    existing.cooking_time = input.cooking_time;
    existing.servings = input.servings;
    existing.thumbnail_uri = input.thumbnail_uri;
    Ok(Some(existing.clone()))
  }

  async fn delete_recipe(&self, id: i32) -> Result<bool, StoreError> {
    let mut tables = self.lock()?;
    let before = tables.recipes.len();
    tables.recipes.retain(|r| r.id != id);
    Ok(tables.recipes.len() < before)
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn now(&self) -> Result<DateTime<Utc>, StoreError> {
    Ok(Utc::now())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_item(name: &str, checked: bool) -> NewItem {
    NewItem {
      name: name.to_string(),
      checked: Some(checked),
      ..Default::default()
    }
  }

  #[tokio::test]
  async fn test_create_applies_defaults() {
    let store = MemoryStore::new();
    let item = store
      .create_item(NewItem {
        name: "Eggs".to_string(),
        ..Default::default()
      })
      .await
      .unwrap();

    assert_eq!(item.id, 1);
    assert_eq!(item.quantity, "1");
    assert_eq!(item.unit, "");
    assert!(!item.checked);
    assert!(item.created_at.is_some());
  }

  #[tokio::test]
  async fn test_list_is_newest_first() {
    let store = MemoryStore::new();
    store.create_item(new_item("first", false)).await.unwrap();
    store.create_item(new_item("second", false)).await.unwrap();
    store.create_item(new_item("third", false)).await.unwrap();

    let names: Vec<String> = store
      .list_items()
      .await
      .unwrap()
      .into_iter()
      .map(|i| i.name)
      .collect();
    assert_eq!(names, vec!["third", "second", "first"]);
  }

  #[tokio::test]
  async fn test_delete_checked_only_removes_checked() {
    let store = MemoryStore::new();
    store.create_item(new_item("keep", false)).await.unwrap();
    store.create_item(new_item("drop a", true)).await.unwrap();
    store.create_item(new_item("drop b", true)).await.unwrap();

    assert_eq!(store.delete_checked_items().await.unwrap(), 2);
    assert_eq!(store.delete_checked_items().await.unwrap(), 0);

    let remaining = store.list_items().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "keep");
  }

  #[tokio::test]
  async fn test_missing_ids() {
    let store = MemoryStore::new();
    let update = ItemUpdate {
      name: "x".to_string(),
      quantity: "1".to_string(),
      unit: String::new(),
      checked: true,
    };

    assert_eq!(store.update_item(42, update).await.unwrap(), None);
    assert!(!store.delete_item(42).await.unwrap());
    assert_eq!(store.get_recipe(42).await.unwrap(), None);
    assert!(!store.delete_recipe(42).await.unwrap());
  }
}
