//! HTTP API for the shopping list and recipes.
//!
//! Every handler performs one store operation and returns its result as
//! JSON. The store handle is constructed once in [`run`] and shared through
//! [`AppState`]; there is no ambient global pool.

mod error;
mod routes;

use axum::{
  http::{header::CONTENT_TYPE, Method},
  routing::{delete, get, put},
  Router,
};
use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::store::{MemoryStore, PgStore, Store};

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
}

impl AppState {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self { store }
  }
}

/// Build the API router over the given state.
pub fn router(state: AppState) -> Router {
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([
      Method::GET,
      Method::POST,
      Method::PUT,
      Method::DELETE,
      Method::OPTIONS,
    ])
    .allow_headers([CONTENT_TYPE])
    .max_age(Duration::from_secs(60 * 60));

  Router::new()
    .route("/", get(routes::welcome))
    .route("/api/health", get(routes::health))
    .route(
      "/api/shopping-list",
      get(routes::shopping_list::list_items).post(routes::shopping_list::create_item),
    )
    // Static segment takes precedence over `{id}`
    .route(
      "/api/shopping-list/checked",
      delete(routes::shopping_list::delete_checked_items),
    )
    .route(
      "/api/shopping-list/{id}",
      put(routes::shopping_list::update_item).delete(routes::shopping_list::delete_item),
    )
    .route(
      "/api/recipes",
      get(routes::recipes::list_recipes).post(routes::recipes::create_recipe),
    )
    .route(
      "/api/recipes/{id}",
      get(routes::recipes::get_recipe)
        .put(routes::recipes::update_recipe)
        .delete(routes::recipes::delete_recipe),
    )
    .layer(TraceLayer::new_for_http())
    .layer(cors)
    .with_state(state)
}

/// Open the configured store. Postgres is probed with a fixed backoff; if it
/// never answers the server still starts and requests fail with 500 until
/// the database comes up.
async fn open_store(config: &ServerConfig, ephemeral: bool) -> Result<Arc<dyn Store>> {
  if ephemeral {
    warn!("Using in-memory store; data will be lost on exit");
    return Ok(Arc::new(MemoryStore::new()));
  }

  let db = &config.database;
  let store = PgStore::connect_lazy(&db.url()?, db.max_connections)
    .map_err(|e| eyre!("Failed to create database pool: {}", e))?;

  if store
    .wait_until_ready(db.connect_attempts, db.retry_delay())
    .await
  {
    info!("Initializing database schema...");
    match store.run_migrations().await {
      Ok(()) => info!("Database schema initialized"),
      Err(e) => error!(error = %e, "Error initializing database schema"),
    }
  }

  Ok(Arc::new(store))
}

/// Run the API server until Ctrl-C or SIGTERM.
pub async fn run(config: &ServerConfig, ephemeral: bool) -> Result<()> {
  info!("Initializing state...");
  let store = open_store(config, ephemeral).await?;
  let app = router(AppState::new(store));

  let listener = TcpListener::bind(&config.bind)
    .await
    .map_err(|e| eyre!("Failed to bind {}: {}", config.bind, e))?;
  info!("Server running on {}", config.bind);

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| eyre!("Server error: {}", e))?;

  info!("Server shut down");
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      error!(error = %e, "Failed to install Ctrl+C handler");
      std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
        info!("Received terminate signal, shutting down");
      }
      Err(e) => {
        error!(error = %e, "Failed to install signal handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::{ApiClient, ShoppingListApi};
  use crate::models::{ItemUpdate, NewItem, Recipe, RecipeInput, ShoppingListItem};
  use crate::store::{ItemStore, RecipeStore, StoreError};
  use async_trait::async_trait;
  use chrono::{DateTime, Utc};
  use reqwest::StatusCode;

  /// Serve the router over a fresh in-memory store on an ephemeral port.
  async fn spawn_server() -> String {
    spawn_server_with(Arc::new(MemoryStore::new())).await
  }

  async fn spawn_server_with(store: Arc<dyn Store>) -> String {
    let app = router(AppState::new(store));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api", addr)
  }

  fn item(name: &str, quantity: &str, unit: &str) -> NewItem {
    NewItem {
      name: name.to_string(),
      quantity: Some(quantity.to_string()),
      unit: Some(unit.to_string()),
      checked: None,
    }
  }

  #[tokio::test]
  async fn test_created_item_is_listed_unchecked() {
    let client = ApiClient::new(&spawn_server().await).unwrap();

    let created = client.create_item(&item("Milk", "2", "L")).await.unwrap();
    let items = client.list_items().await.unwrap();

    let matching: Vec<_> = items
      .iter()
      .filter(|i| i.name == "Milk" && i.quantity == "2" && i.unit == "L")
      .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].id, created.id);
    assert!(!matching[0].checked);
  }

  #[tokio::test]
  async fn test_post_with_only_name() {
    let base = spawn_server().await;
    let http = reqwest::Client::new();

    let resp = http
      .post(format!("{}/shopping-list", base))
      .json(&serde_json::json!({ "name": "Eggs" }))
      .send()
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let items = ApiClient::new(&base).unwrap().list_items().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Eggs");
    assert_eq!(items[0].quantity, "1");
    assert!(!items[0].checked);
  }

  #[tokio::test]
  async fn test_delete_checked_removes_only_checked() {
    let client = ApiClient::new(&spawn_server().await).unwrap();

    let keep = client.create_item(&item("Bread", "1", "")).await.unwrap();
    let butter = client.create_item(&item("Butter", "250", "g")).await.unwrap();
    client
      .update_item(
        butter.id,
        &ItemUpdate {
          checked: true,
          ..ItemUpdate::from(&butter)
        },
      )
      .await
      .unwrap();

    let message = client.delete_checked_items().await.unwrap();
    assert_eq!(message.message, "1 checked items deleted successfully");

    let items = client.list_items().await.unwrap();
    assert_eq!(items, vec![keep]);

    let message = client.delete_checked_items().await.unwrap();
    assert_eq!(message.message, "0 checked items deleted successfully");
  }

  #[tokio::test]
  async fn test_toggle_twice_round_trips() {
    let client = ApiClient::new(&spawn_server().await).unwrap();
    let original = client.create_item(&item("Apples", "6", "")).await.unwrap();

    let mut update = ItemUpdate::from(&original);
    update.checked = !update.checked;
    let once = client.update_item(original.id, &update).await.unwrap();
    assert!(once.checked);

    update.checked = !update.checked;
    let twice = client.update_item(original.id, &update).await.unwrap();
    assert_eq!(twice, original);
  }

  #[tokio::test]
  async fn test_missing_item_is_not_found() {
    let base = spawn_server().await;
    let http = reqwest::Client::new();

    let resp = http
      .put(format!("{}/shopping-list/999", base))
      .json(&serde_json::json!({ "name": "Ghost", "quantity": "1", "unit": "", "checked": true }))
      .send()
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Shopping list item not found");

    let resp = http
      .delete(format!("{}/shopping-list/999", base))
      .send()
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let client = ApiClient::new(&base).unwrap();
    assert!(client.delete_item(999).await.is_err());
  }

  #[tokio::test]
  async fn test_delete_item_confirms() {
    let client = ApiClient::new(&spawn_server().await).unwrap();
    let created = client.create_item(&item("Salt", "1", "pack")).await.unwrap();

    let message = client.delete_item(created.id).await.unwrap();
    assert_eq!(message.message, "Shopping list item deleted successfully");
    assert!(client.list_items().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_recipe_crud() {
    let base = spawn_server().await;
    let http = reqwest::Client::new();
    let input = RecipeInput {
      title: "Pancakes".to_string(),
      ingredients: vec!["flour".to_string(), "milk".to_string(), "eggs".to_string()],
      instructions: "Mix and fry.".to_string(),
      cooking_time: Some(20),
      servings: Some(4),
      thumbnail_uri: None,
    };

    let resp = http
      .post(format!("{}/recipes", base))
      .json(&input)
      .send()
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: crate::models::Recipe = resp.json().await.unwrap();
    assert_eq!(created.ingredients.len(), 3);

    let updated = RecipeInput {
      servings: Some(2),
      ..input
    };
    let resp = http
      .put(format!("{}/recipes/{}", base, created.id))
      .json(&updated)
      .send()
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let fetched: crate::models::Recipe = http
      .get(format!("{}/recipes/{}", base, created.id))
      .send()
      .await
      .unwrap()
      .json()
      .await
      .unwrap();
    assert_eq!(fetched.servings, Some(2));

    let resp = http
      .delete(format!("{}/recipes/{}", base, created.id))
      .send()
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = http
      .get(format!("{}/recipes/{}", base, created.id))
      .send()
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn test_health_reports_time() {
    let base = spawn_server().await;
    let body: serde_json::Value = reqwest::get(format!("{}/health", base))
      .await
      .unwrap()
      .json()
      .await
      .unwrap();
    assert!(body["time"].is_string());
  }

  /// Store whose every operation fails
  struct FaultyStore;

  #[async_trait]
  impl ItemStore for FaultyStore {
    async fn list_items(&self) -> Result<Vec<ShoppingListItem>, StoreError> {
      Err(StoreError::Poisoned)
    }

    async fn create_item(&self, _item: NewItem) -> Result<ShoppingListItem, StoreError> {
      Err(StoreError::Poisoned)
    }

    async fn update_item(
      &self,
      _id: i32,
      _update: ItemUpdate,
    ) -> Result<Option<ShoppingListItem>, StoreError> {
      Err(StoreError::Poisoned)
    }

    async fn delete_item(&self, _id: i32) -> Result<bool, StoreError> {
      Err(StoreError::Poisoned)
    }

    async fn delete_checked_items(&self) -> Result<u64, StoreError> {
      Err(StoreError::Poisoned)
    }
  }

  #[async_trait]
  impl RecipeStore for FaultyStore {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
      Err(StoreError::Poisoned)
    }

    async fn get_recipe(&self, _id: i32) -> Result<Option<Recipe>, StoreError> {
      Err(StoreError::Poisoned)
    }

    async fn create_recipe(&self, _input: RecipeInput) -> Result<Recipe, StoreError> {
      Err(StoreError::Poisoned)
    }

    async fn update_recipe(
      &self,
      _id: i32,
      _input: RecipeInput,
    ) -> Result<Option<Recipe>, StoreError> {
      Err(StoreError::Poisoned)
    }

    async fn delete_recipe(&self, _id: i32) -> Result<bool, StoreError> {
      Err(StoreError::Poisoned)
    }
  }

  #[async_trait]
  impl Store for FaultyStore {
    async fn now(&self) -> Result<DateTime<Utc>, StoreError> {
      Err(StoreError::Poisoned)
    }
  }

  #[tokio::test]
  async fn test_store_fault_is_opaque_500() {
    let base = spawn_server_with(Arc::new(FaultyStore)).await;
    let http = reqwest::Client::new();

    let update = serde_json::json!({
      "name": "Milk",
      "quantity": "2",
      "unit": "L",
      "checked": true,
    });
    let requests = [
      http.get(format!("{}/shopping-list", base)),
      http
        .post(format!("{}/shopping-list", base))
        .json(&serde_json::json!({ "name": "Milk" })),
      http.put(format!("{}/shopping-list/1", base)).json(&update),
      http.delete(format!("{}/shopping-list/1", base)),
      http.delete(format!("{}/shopping-list/checked", base)),
      http.get(format!("{}/recipes/1", base)),
      http.get(format!("{}/health", base)),
    ];

    for request in requests {
      let resp = request.send().await.unwrap();
      let url = resp.url().to_string();
      assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", url);
      let body: serde_json::Value = resp.json().await.unwrap();
      assert_eq!(body, serde_json::json!({ "error": "Server error" }), "{}", url);
    }
  }

  #[tokio::test]
  async fn test_client_reports_store_fault() {
    let client = ApiClient::new(&spawn_server_with(Arc::new(FaultyStore)).await).unwrap();
    let err = client.delete_checked_items().await.unwrap_err();
    assert!(err.to_string().contains("500"), "{}", err);
  }
}
