use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
  /// The mutation or lookup targeted an id with no row behind it
  #[error("{0} not found")]
  NotFound(&'static str),

  /// Connectivity or query failure. Logged, then reported opaquely.
  #[error("Store fault: {0}")]
  Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
      ApiError::Store(e) => {
        error!(error = %e, "Store fault while handling request");
        (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
      }
    };

    (status, Json(json!({ "error": message }))).into_response()
  }
}
