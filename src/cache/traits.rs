//! Core traits for the caching system.

use serde::{de::DeserializeOwned, Serialize};

/// Trait for entities that can be cached.
///
/// The serialized form is what gets persisted, so it should match the wire
/// format of the entity exactly.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Entity type name for storage organization (e.g., "shopping_list_item")
  fn entity_type() -> &'static str;
}
