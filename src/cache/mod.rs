//! Local durable cache for offline fallback.
//!
//! Holds the last known snapshot of a list under a single key. The snapshot
//! is never authoritative: it is only read back when the network is
//! unavailable, and it is overwritten wholesale on every write.

mod layer;
mod storage;
mod traits;

pub use layer::SnapshotCache;
pub use storage::{CacheStorage, NoopStorage, SqliteStorage};
pub use traits::Cacheable;
