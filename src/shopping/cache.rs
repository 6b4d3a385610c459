//! Caching implementations for shopping list types.

use sha2::{Digest, Sha256};

use crate::cache::Cacheable;
use crate::models::ShoppingListItem;

impl Cacheable for ShoppingListItem {
  fn entity_type() -> &'static str {
    "shopping_list_item"
  }
}

/// Cache key for the shopping list served by `api_url`.
///
/// Keyed per backend so that pointing the client at another server never
/// serves the first server's items as a fallback.
pub fn list_cache_key(api_url: &str) -> String {
  let input = format!("shopping_list:{}", api_url.trim_end_matches('/'));

  // SHA256 hash for stable, fixed-length keys
  let mut hasher = Sha256::new();
  hasher.update(input.as_bytes());
  hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_key_is_stable_hex() {
    let key = list_cache_key("http://localhost:3000/api/");
    assert_eq!(key.len(), 64);
    assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(key, list_cache_key("http://localhost:3000/api"));
  }

  #[test]
  fn test_key_differs_per_backend() {
    assert_ne!(
      list_cache_key("http://localhost:3000/api"),
      list_cache_key("http://pantry.example:3000/api")
    );
  }
}
