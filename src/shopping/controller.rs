//! Client-side owner of the shopping list view state.
//!
//! Operations start an API round trip on the tokio runtime and return
//! immediately. Each round trip finishes by sending a [`ListEvent`] back
//! over a channel, and the controller's reducer is the only place the view
//! state changes. Whenever the item list changes, the whole list is written
//! to the snapshot cache.
//!
//! Requests are not sequenced or cancelled: if two mutations race, the
//! response that resolves last determines the final state.

use chrono::{DateTime, Utc};
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::draft::ItemDraft;
use crate::api::ShoppingListApi;
use crate::cache::{CacheStorage, SnapshotCache};
use crate::models::{ItemUpdate, MessageResponse, ShoppingListItem};

const LOAD_FAILED: &str = "Failed to load the shopping list. Please try again later.";
const ADD_FAILED: &str = "Failed to add the item. Please try again later.";
const UPDATE_FAILED: &str = "Failed to update the item. Please try again later.";
const DELETE_FAILED: &str = "Failed to delete the item. Please try again later.";
const CLEAR_FAILED: &str = "Failed to remove the checked items. Please try again later.";

/// Progress of the most recent list load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
  Idle,
  Loading,
  Success,
  Error,
}

/// Completion of one API round trip
#[derive(Debug)]
pub enum ListEvent {
  Loaded(Result<Vec<ShoppingListItem>, String>),
  Added(Result<ShoppingListItem, String>),
  Updated(Result<ShoppingListItem, String>),
  Deleted {
    id: i32,
    result: Result<MessageResponse, String>,
  },
  CheckedCleared(Result<MessageResponse, String>),
}

pub struct ListController<A: ShoppingListApi, S: CacheStorage> {
  api: A,
  cache: SnapshotCache<S>,
  load_state: LoadState,
  items: Vec<ShoppingListItem>,
  /// User-visible failure message, shown until the next success
  error: Option<String>,
  /// Last confirmation message from the server
  notice: Option<String>,
  /// Set while `items` came from the cache rather than the server
  stale_since: Option<DateTime<Utc>>,
  tx: mpsc::UnboundedSender<ListEvent>,
  rx: mpsc::UnboundedReceiver<ListEvent>,
}

impl<A: ShoppingListApi, S: CacheStorage> ListController<A, S> {
  pub fn new(api: A, cache: SnapshotCache<S>) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      api,
      cache,
      load_state: LoadState::Idle,
      items: Vec::new(),
      error: None,
      notice: None,
      stale_since: None,
      tx,
      rx,
    }
  }

  pub fn items(&self) -> &[ShoppingListItem] {
    &self.items
  }

  pub fn load_state(&self) -> LoadState {
    self.load_state
  }

  pub fn is_loading(&self) -> bool {
    self.load_state == LoadState::Loading
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn notice(&self) -> Option<&str> {
    self.notice.as_deref()
  }

  pub fn stale_since(&self) -> Option<DateTime<Utc>> {
    self.stale_since
  }

  pub fn checked_count(&self) -> usize {
    self.items.iter().filter(|i| i.checked).count()
  }

  /// Fetch the full list. No-op while a load is already in flight.
  pub fn load(&mut self) {
    if self.is_loading() {
      return;
    }
    self.load_state = LoadState::Loading;

    let api = self.api.clone();
    self.spawn(async move {
      ListEvent::Loaded(api.list_items().await.map_err(|e| e.to_string()))
    });
  }

  /// Create an item from `draft`. Returns `false` without contacting the
  /// server when the name is blank.
  pub fn add_item(&mut self, draft: &ItemDraft) -> bool {
    let Some(item) = draft.to_new_item() else {
      debug!("Ignoring item with blank name");
      return false;
    };

    let api = self.api.clone();
    self.spawn(async move {
      ListEvent::Added(api.create_item(&item).await.map_err(|e| e.to_string()))
    });
    true
  }

  /// Flip the checked flag of item `id`. Returns `false` if the item is not
  /// in the current list.
  pub fn toggle_checked(&mut self, id: i32) -> bool {
    let Some(item) = self.find(id) else {
      return false;
    };
    let mut update = ItemUpdate::from(item);
    update.checked = !update.checked;

    let api = self.api.clone();
    self.spawn(async move {
      ListEvent::Updated(api.update_item(id, &update).await.map_err(|e| e.to_string()))
    });
    true
  }

  /// Overwrite name, quantity and unit of item `id`, keeping its checked
  /// state. Returns `false` for an unknown id or a blank name.
  pub fn edit_item(&mut self, id: i32, draft: &ItemDraft) -> bool {
    let Some(item) = self.find(id) else {
      return false;
    };
    let Some(update) = draft.to_update(item.checked) else {
      debug!(id, "Ignoring edit with blank name");
      return false;
    };

    let api = self.api.clone();
    self.spawn(async move {
      ListEvent::Updated(api.update_item(id, &update).await.map_err(|e| e.to_string()))
    });
    true
  }

  pub fn delete_item(&mut self, id: i32) {
    let api = self.api.clone();
    self.spawn(async move {
      ListEvent::Deleted {
        id,
        result: api.delete_item(id).await.map_err(|e| e.to_string()),
      }
    });
  }

  /// Delete every checked item on the server. On success the local list is
  /// filtered with the same predicate instead of being re-fetched.
  pub fn clear_checked(&mut self) {
    let api = self.api.clone();
    self.spawn(async move {
      ListEvent::CheckedCleared(api.delete_checked_items().await.map_err(|e| e.to_string()))
    });
  }

  /// Apply every completed round trip without blocking.
  ///
  /// Returns `true` if any event was applied. Call this in the UI tick.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    while let Ok(event) = self.rx.try_recv() {
      self.apply(event);
      changed = true;
    }
    changed
  }

  /// Wait for the next round trip to complete and apply it.
  #[cfg(test)]
  pub async fn settle(&mut self) {
    // The controller owns a sender, so the channel never closes
    if let Some(event) = self.rx.recv().await {
      self.apply(event);
    }
  }

  fn find(&self, id: i32) -> Option<&ShoppingListItem> {
    self.items.iter().find(|i| i.id == id)
  }

  fn spawn<F>(&self, request: F)
  where
    F: Future<Output = ListEvent> + Send + 'static,
  {
    let tx = self.tx.clone();
    tokio::spawn(async move {
      // Receiver may be gone if the controller was dropped mid-request
      let _ = tx.send(request.await);
    });
  }

  /// The view-state reducer.
  fn apply(&mut self, event: ListEvent) {
    match event {
      ListEvent::Loaded(Ok(items)) => {
        info!(count = items.len(), "Shopping list loaded");
        self.load_state = LoadState::Success;
        self.error = None;
        self.stale_since = None;
        self.set_items(items);
      }
      ListEvent::Loaded(Err(e)) => {
        warn!(error = %e, "Error fetching shopping list items");
        self.load_state = LoadState::Error;
        self.error = Some(LOAD_FAILED.to_string());
        self.restore_snapshot();
      }
      ListEvent::Added(Ok(item)) => {
        let mut items = std::mem::take(&mut self.items);
        items.push(item);
        self.succeed(None);
        self.set_items(items);
      }
      ListEvent::Updated(Ok(updated)) => {
        let items = self
          .items
          .iter()
          .map(|i| if i.id == updated.id { updated.clone() } else { i.clone() })
          .collect();
        self.succeed(None);
        self.set_items(items);
      }
      ListEvent::Deleted {
        id,
        result: Ok(response),
      } => {
        let items = self.items.iter().filter(|i| i.id != id).cloned().collect();
        self.succeed(Some(response.message));
        self.set_items(items);
      }
      ListEvent::CheckedCleared(Ok(response)) => {
        let items = self.items.iter().filter(|i| !i.checked).cloned().collect();
        self.succeed(Some(response.message));
        self.set_items(items);
      }
      ListEvent::Added(Err(e)) => self.fail(ADD_FAILED, &e),
      ListEvent::Updated(Err(e)) => self.fail(UPDATE_FAILED, &e),
      ListEvent::Deleted { result: Err(e), .. } => self.fail(DELETE_FAILED, &e),
      ListEvent::CheckedCleared(Err(e)) => self.fail(CLEAR_FAILED, &e),
    }
  }

  fn succeed(&mut self, notice: Option<String>) {
    self.error = None;
    self.notice = notice;
  }

  /// Mutation failures leave the list untouched and never read the cache.
  fn fail(&mut self, message: &str, cause: &str) {
    warn!(error = %cause, "{}", message);
    self.error = Some(message.to_string());
    self.notice = None;
  }

  /// Degraded mode: adopt the last cached snapshot, if any. The error stays
  /// set so the view can flag the data as stale.
  fn restore_snapshot(&mut self) {
    match self.cache.restore::<ShoppingListItem>() {
      Ok(Some(snapshot)) => {
        info!(
          count = snapshot.entities.len(),
          cached_at = %snapshot.cached_at,
          "Serving cached shopping list"
        );
        self.stale_since = Some(snapshot.cached_at);
        self.set_items(snapshot.entities);
      }
      Ok(None) => debug!("No cached shopping list to fall back to"),
      Err(e) => warn!(error = %e, "Failed to read cached shopping list"),
    }
  }

  /// Replace the item list, then persist it. Every change to `items` goes
  /// through here.
  fn set_items(&mut self, items: Vec<ShoppingListItem>) {
    self.items = items;
    if let Err(e) = self.cache.save(&self.items) {
      warn!(error = %e, key = self.cache.key(), "Failed to write shopping list cache");
    }
  }
}
