//! Wire and storage types shared by the server and the terminal client.
//!
//! The JSON shape of [`ShoppingListItem`] is the one the API returns and the
//! one the client cache persists, so both sides stay byte-compatible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quantity stored when a create request omits it
pub const DEFAULT_QUANTITY: &str = "1";

fn default_quantity() -> String {
  DEFAULT_QUANTITY.to_string()
}

/// A persisted shopping list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShoppingListItem {
  pub id: i32,
  pub name: String,
  /// Free-form text, not necessarily numeric ("2", "a handful")
  pub quantity: String,
  pub unit: String,
  pub checked: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/shopping-list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub quantity: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unit: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub checked: Option<bool>,
}

/// Body of `PUT /api/shopping-list/{id}`; overwrites every mutable field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
  pub name: String,
  #[serde(default = "default_quantity")]
  pub quantity: String,
  #[serde(default)]
  pub unit: String,
  #[serde(default)]
  pub checked: bool,
}

impl From<&ShoppingListItem> for ItemUpdate {
  fn from(item: &ShoppingListItem) -> Self {
    Self {
      name: item.name.clone(),
      quantity: item.quantity.clone(),
      unit: item.unit.clone(),
      checked: item.checked,
    }
  }
}

/// A stored recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
  pub id: i32,
  pub title: String,
  pub ingredients: Vec<String>,
  pub instructions: String,
  /// Minutes
  pub cooking_time: Option<i32>,
  pub servings: Option<i32>,
  pub thumbnail_uri: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
}

/// Body of recipe create and update requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInput {
  pub title: String,
  #[serde(default)]
  pub ingredients: Vec<String>,
  #[serde(default)]
  pub instructions: String,
  pub cooking_time: Option<i32>,
  pub servings: Option<i32>,
  pub thumbnail_uri: Option<String>,
}

/// Confirmation body returned by delete endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
  pub message: String,
}

impl MessageResponse {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_item_without_timestamp_deserializes() {
    let json = r#"[{"id":1,"name":"Milk","quantity":"2","unit":"L","checked":false}]"#;
    let items: Vec<ShoppingListItem> = serde_json::from_str(json).unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Milk");
    assert_eq!(items[0].created_at, None);
  }

  #[test]
  fn test_new_item_omits_missing_fields() {
    let item = NewItem {
      name: "Eggs".to_string(),
      ..Default::default()
    };
    let json = serde_json::to_value(&item).unwrap();

    assert_eq!(json, serde_json::json!({ "name": "Eggs" }));
  }

  #[test]
  fn test_update_defaults() {
    let update: ItemUpdate = serde_json::from_str(r#"{"name":"Bread"}"#).unwrap();

    assert_eq!(update.quantity, "1");
    assert_eq!(update.unit, "");
    assert!(!update.checked);
  }
}
