use axum::{
  extract::{Path, State},
  http::StatusCode,
  Json,
};
use tracing::info;

use crate::models::{ItemUpdate, MessageResponse, NewItem, ShoppingListItem};
use crate::server::{error::ApiError, AppState};
use crate::store::ItemStore;

const ITEM: &str = "Shopping list item";

pub async fn list_items(
  State(state): State<AppState>,
) -> Result<Json<Vec<ShoppingListItem>>, ApiError> {
  Ok(Json(state.store.list_items().await?))
}

pub async fn create_item(
  State(state): State<AppState>,
  Json(item): Json<NewItem>,
) -> Result<(StatusCode, Json<ShoppingListItem>), ApiError> {
  let created = state.store.create_item(item).await?;
  info!(id = created.id, name = %created.name, "Shopping list item created");
  Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_item(
  State(state): State<AppState>,
  Path(id): Path<i32>,
  Json(update): Json<ItemUpdate>,
) -> Result<Json<ShoppingListItem>, ApiError> {
  state
    .store
    .update_item(id, update)
    .await?
    .map(Json)
    .ok_or(ApiError::NotFound(ITEM))
}

pub async fn delete_item(
  State(state): State<AppState>,
  Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
  if !state.store.delete_item(id).await? {
    return Err(ApiError::NotFound(ITEM));
  }
  Ok(Json(MessageResponse::new(
    "Shopping list item deleted successfully",
  )))
}

pub async fn delete_checked_items(
  State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
  let removed = state.store.delete_checked_items().await?;
  info!(removed, "Checked items cleared");
  Ok(Json(MessageResponse::new(format!(
    "{} checked items deleted successfully",
    removed
  ))))
}
