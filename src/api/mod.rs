//! Client side of the shopping list API.

mod client;

use async_trait::async_trait;
use color_eyre::Result;

use crate::models::{ItemUpdate, MessageResponse, NewItem, ShoppingListItem};

pub use client::ApiClient;

/// Remote operations the list controller depends on.
///
/// Implementations must be cheap to clone; each in-flight request holds its
/// own clone.
#[async_trait]
pub trait ShoppingListApi: Clone + Send + Sync + 'static {
  async fn list_items(&self) -> Result<Vec<ShoppingListItem>>;

  async fn create_item(&self, item: &NewItem) -> Result<ShoppingListItem>;

  async fn update_item(&self, id: i32, update: &ItemUpdate) -> Result<ShoppingListItem>;

  async fn delete_item(&self, id: i32) -> Result<MessageResponse>;

  async fn delete_checked_items(&self) -> Result<MessageResponse>;
}
