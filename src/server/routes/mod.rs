pub mod recipes;
pub mod shopping_list;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::{error::ApiError, AppState};
use crate::store::Store;

pub async fn welcome() -> Json<Value> {
  Json(json!({ "message": "Welcome to the API" }))
}

/// Store round trip, for liveness probes
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
  let time = state.store.now().await?;
  Ok(Json(json!({ "time": time.to_rfc3339() })))
}
