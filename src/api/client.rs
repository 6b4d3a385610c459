use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::ShoppingListApi;
use crate::models::{ItemUpdate, MessageResponse, NewItem, ShoppingListItem};

/// HTTP client for the larder API
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base: Url,
}

impl ApiClient {
  /// `base_url` is the API root including the `/api` prefix,
  /// e.g. `http://localhost:3000/api`.
  pub fn new(base_url: &str) -> Result<Self> {
    let mut base =
      Url::parse(base_url).map_err(|e| eyre!("Invalid API URL {}: {}", base_url, e))?;

    // Url::join replaces the last segment unless the path ends in a slash
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }

    let http = reqwest::Client::builder()
      .user_agent(concat!("larder/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base })
  }

  pub fn base_url(&self) -> &Url {
    &self.base
  }

  fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
    let url = self
      .base
      .join(path)
      .map_err(|e| eyre!("Invalid endpoint {}: {}", path, e))?;
    Ok(self.http.request(method, url))
  }

  /// Send a request and decode the JSON body, treating non-2xx as failure.
  async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, action: &str) -> Result<T> {
    let response: Response = request
      .send()
      .await
      .map_err(|e| eyre!("Failed to {}: {}", action, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(eyre!("Failed to {}: server returned {}", action, status));
    }

    response
      .json()
      .await
      .map_err(|e| eyre!("Failed to {}: invalid response body: {}", action, e))
  }
}

#[async_trait]
impl ShoppingListApi for ApiClient {
  async fn list_items(&self) -> Result<Vec<ShoppingListItem>> {
    let request = self.request(Method::GET, "shopping-list")?;
    self.send(request, "fetch shopping list items").await
  }

  async fn create_item(&self, item: &NewItem) -> Result<ShoppingListItem> {
    let request = self.request(Method::POST, "shopping-list")?.json(item);
    self.send(request, "add shopping list item").await
  }

  async fn update_item(&self, id: i32, update: &ItemUpdate) -> Result<ShoppingListItem> {
    let request = self
      .request(Method::PUT, &format!("shopping-list/{}", id))?
      .json(update);
    self
      .send(request, &format!("update shopping list item {}", id))
      .await
  }

  async fn delete_item(&self, id: i32) -> Result<MessageResponse> {
    let request = self.request(Method::DELETE, &format!("shopping-list/{}", id))?;
    self
      .send(request, &format!("delete shopping list item {}", id))
      .await
  }

  async fn delete_checked_items(&self) -> Result<MessageResponse> {
    let request = self.request(Method::DELETE, "shopping-list/checked")?;
    self
      .send(request, "delete checked shopping list items")
      .await
  }
}
