use crate::models::ShoppingListItem;

/// Truncate a string to at most `max_len` chars, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// "2 L", or just "2" when the item has no unit
pub fn quantity_label(item: &ShoppingListItem) -> String {
  match item.unit.trim() {
    "" => item.quantity.clone(),
    unit => format!("{} {}", item.quantity, unit),
  }
}
