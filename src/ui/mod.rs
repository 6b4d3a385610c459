mod components;
mod renderfns;
mod views;

pub use views::{ShoppingListView, ViewAction};

use crate::api::ShoppingListApi;
use crate::app::App;
use crate::cache::CacheStorage;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Main draw function
pub fn draw<A: ShoppingListApi, S: CacheStorage>(frame: &mut Frame, app: &mut App<A, S>) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // List
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  renderfns::draw_header(frame, chunks[0], app.api_url());

  let view = app.view_mut();
  view.render(frame, chunks[1]);
  renderfns::draw_footer(frame, chunks[2], view.notice());
}

/// Keep the selection inside a list of `len` rows
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    None => state.select(Some(0)),
    Some(idx) if idx >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}
