use axum::{
  extract::{Path, State},
  http::StatusCode,
  Json,
};

use crate::models::{MessageResponse, Recipe, RecipeInput};
use crate::server::{error::ApiError, AppState};
use crate::store::RecipeStore;

const RECIPE: &str = "Recipe";

pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
  Ok(Json(state.store.list_recipes().await?))
}

pub async fn get_recipe(
  State(state): State<AppState>,
  Path(id): Path<i32>,
) -> Result<Json<Recipe>, ApiError> {
  state
    .store
    .get_recipe(id)
    .await?
    .map(Json)
    .ok_or(ApiError::NotFound(RECIPE))
}

pub async fn create_recipe(
  State(state): State<AppState>,
  Json(input): Json<RecipeInput>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
  let created = state.store.create_recipe(input).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_recipe(
  State(state): State<AppState>,
  Path(id): Path<i32>,
  Json(input): Json<RecipeInput>,
) -> Result<Json<Recipe>, ApiError> {
  state
    .store
    .update_recipe(id, input)
    .await?
    .map(Json)
    .ok_or(ApiError::NotFound(RECIPE))
}

pub async fn delete_recipe(
  State(state): State<AppState>,
  Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
  if !state.store.delete_recipe(id).await? {
    return Err(ApiError::NotFound(RECIPE));
  }
  Ok(Json(MessageResponse::new("Recipe deleted successfully")))
}
