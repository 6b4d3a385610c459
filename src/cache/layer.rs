//! Keyed snapshot cache over a storage backend.

use color_eyre::Result;

use super::storage::{CacheStorage, CachedSnapshot};
use super::traits::Cacheable;

/// A single cache entry holding the full snapshot of one list.
///
/// Writes always replace the whole entry; there is no merging.
pub struct SnapshotCache<S: CacheStorage> {
  storage: S,
  key: String,
}

impl<S: CacheStorage> SnapshotCache<S> {
  /// Create a cache bound to `key` in the given storage backend.
  pub fn new(storage: S, key: impl Into<String>) -> Self {
    Self {
      storage,
      key: key.into(),
    }
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  /// Overwrite the snapshot with `entities`.
  pub fn save<T: Cacheable>(&self, entities: &[T]) -> Result<()> {
    self.storage.store_snapshot(&self.key, entities)
  }

  /// Read back the last saved snapshot.
  pub fn restore<T: Cacheable>(&self) -> Result<Option<CachedSnapshot<T>>> {
    self.storage.get_snapshot(&self.key)
  }
}
