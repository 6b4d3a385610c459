mod shopping_list;

pub use shopping_list::ShoppingListView;

/// What a view asks the app to do after handling a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
  None,
  Quit,
}
