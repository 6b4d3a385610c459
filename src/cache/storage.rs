//! Cache storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::traits::Cacheable;

/// A cached list snapshot.
#[derive(Debug, Clone)]
pub struct CachedSnapshot<T> {
  /// The cached entities in their original order
  pub entities: Vec<T>,
  /// When the snapshot was written
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Replace the snapshot stored under `key`.
  fn store_snapshot<T: Cacheable>(&self, key: &str, entities: &[T]) -> Result<()>;

  /// Get the snapshot stored under `key`, if any.
  fn get_snapshot<T: Cacheable>(&self, key: &str) -> Result<Option<CachedSnapshot<T>>>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn store_snapshot<T: Cacheable>(&self, _key: &str, _entities: &[T]) -> Result<()> {
    Ok(()) // Discard
  }

  fn get_snapshot<T: Cacheable>(&self, _key: &str) -> Result<Option<CachedSnapshot<T>>> {
    Ok(None) // Always miss
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open or create the cache database at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;

    Ok(storage)
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- One serialized JSON array per key
CREATE TABLE IF NOT EXISTS snapshot_cache (
    cache_key TEXT PRIMARY KEY,
    entity_type TEXT NOT NULL,
    data BLOB NOT NULL,
    item_count INTEGER NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl CacheStorage for SqliteStorage {
  fn store_snapshot<T: Cacheable>(&self, key: &str, entities: &[T]) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let data =
      serde_json::to_vec(entities).map_err(|e| eyre!("Failed to serialize snapshot: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO snapshot_cache (cache_key, entity_type, data, item_count, cached_at)
         VALUES (?, ?, ?, ?, datetime('now'))",
        params![key, T::entity_type(), data, entities.len()],
      )
      .map_err(|e| eyre!("Failed to store snapshot: {}", e))?;

    Ok(())
  }

  fn get_snapshot<T: Cacheable>(&self, key: &str) -> Result<Option<CachedSnapshot<T>>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(Vec<u8>, String)> = conn
      .query_row(
        "SELECT data, cached_at FROM snapshot_cache
         WHERE cache_key = ? AND entity_type = ?",
        params![key, T::entity_type()],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read snapshot: {}", e))?;

    match row {
      Some((data, cached_at_str)) => {
        let entities: Vec<T> = serde_json::from_slice(&data)
          .map_err(|e| eyre!("Failed to deserialize snapshot: {}", e))?;
        let cached_at = parse_datetime(&cached_at_str)?;
        Ok(Some(CachedSnapshot {
          entities,
          cached_at,
        }))
      }
      None => Ok(None),
    }
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::{Deserialize, Serialize};

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Note {
    id: u32,
    text: String,
  }

  impl Cacheable for Note {
    fn entity_type() -> &'static str {
      "note"
    }
  }

  #[derive(Debug, Clone, Serialize, Deserialize)]
  struct Other;

  impl Cacheable for Other {
    fn entity_type() -> &'static str {
      "other"
    }
  }

  fn notes(texts: &[&str]) -> Vec<Note> {
    texts
      .iter()
      .enumerate()
      .map(|(i, t)| Note {
        id: i as u32,
        text: t.to_string(),
      })
      .collect()
  }

  #[test]
  fn test_snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("cache.db");

    {
      let storage = SqliteStorage::open(&path).unwrap();
      storage.store_snapshot("list", &notes(&["a", "b"])).unwrap();
    }

    let storage = SqliteStorage::open(&path).unwrap();
    let snapshot = storage.get_snapshot::<Note>("list").unwrap().unwrap();
    assert_eq!(snapshot.entities, notes(&["a", "b"]));
    assert!(Utc::now() - snapshot.cached_at < chrono::Duration::minutes(1));
  }

  #[test]
  fn test_store_overwrites_wholesale() {
    let dir = tempfile::tempdir().unwrap();
    let storage = SqliteStorage::open(&dir.path().join("cache.db")).unwrap();

    storage
      .store_snapshot("list", &notes(&["a", "b", "c"]))
      .unwrap();
    storage.store_snapshot("list", &notes(&["z"])).unwrap();

    let snapshot = storage.get_snapshot::<Note>("list").unwrap().unwrap();
    assert_eq!(snapshot.entities, notes(&["z"]));
  }

  #[test]
  fn test_empty_snapshot_is_not_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let storage = SqliteStorage::open(&dir.path().join("cache.db")).unwrap();

    storage.store_snapshot::<Note>("list", &[]).unwrap();
    let snapshot = storage.get_snapshot::<Note>("list").unwrap().unwrap();
    assert!(snapshot.entities.is_empty());
  }

  #[test]
  fn test_keys_and_types_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let storage = SqliteStorage::open(&dir.path().join("cache.db")).unwrap();

    storage.store_snapshot("one", &notes(&["a"])).unwrap();

    assert!(storage.get_snapshot::<Note>("two").unwrap().is_none());
    assert!(storage.get_snapshot::<Other>("one").unwrap().is_none());
  }

  #[test]
  fn test_noop_storage_always_misses() {
    let storage = NoopStorage;
    storage.store_snapshot("list", &notes(&["a"])).unwrap();
    assert!(storage.get_snapshot::<Note>("list").unwrap().is_none());
  }

  #[test]
  fn test_schema_columns() {
    let dir = tempfile::tempdir().unwrap();
    let storage = SqliteStorage::open(&dir.path().join("cache.db")).unwrap();
    let conn = storage.conn.lock().unwrap();

    let mut stmt = conn
      .prepare("SELECT name, pk FROM pragma_table_info('snapshot_cache') ORDER BY cid")
      .unwrap();
    let columns: Vec<(String, i64)> = stmt
      .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
      .unwrap()
      .collect::<Result<_, _>>()
      .unwrap();

    let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
      names,
      ["cache_key", "entity_type", "data", "item_count", "cached_at"]
    );
    assert_eq!(columns[0].1, 1);
  }
}
