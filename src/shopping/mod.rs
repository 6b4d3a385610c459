//! Shopping list client: view state, offline snapshot, and input parsing.

mod cache;
mod controller;
mod draft;

pub use cache::list_cache_key;
pub use controller::{ListController, LoadState};
pub use draft::ItemDraft;
