use crate::api::ShoppingListApi;
use crate::cache::CacheStorage;
use crate::models::ShoppingListItem;
use crate::shopping::{ItemDraft, ListController, LoadState};
use crate::ui::components::{ItemPrompt, KeyResult, PromptEvent, PromptTarget};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{quantity_label, truncate};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::ViewAction;

const NAME_WIDTH: usize = 32;

/// The shopping list screen
pub struct ShoppingListView<A: ShoppingListApi, S: CacheStorage> {
  controller: ListController<A, S>,
  list_state: ListState,
  prompt: ItemPrompt,
}

impl<A: ShoppingListApi, S: CacheStorage> ShoppingListView<A, S> {
  pub fn new(controller: ListController<A, S>) -> Self {
    let mut controller = controller;
    // Start fetching immediately
    controller.load();

    Self {
      controller,
      list_state: ListState::default(),
      prompt: ItemPrompt::new(),
    }
  }

  pub fn notice(&self) -> Option<&str> {
    self.controller.notice()
  }

  fn selected_item(&self) -> Option<&ShoppingListItem> {
    self
      .list_state
      .selected()
      .and_then(|idx| self.controller.items().get(idx))
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_prompt(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  /// Called on each tick to apply finished requests
  pub fn tick(&mut self) {
    self.controller.poll();
  }

  fn handle_prompt(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.prompt.handle_key(key) {
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::Event(PromptEvent::Submitted { target, draft }) => {
        match target {
          PromptTarget::Add => self.controller.add_item(&draft),
          PromptTarget::Edit(id) => self.controller.edit_item(id, &draft),
        };
        Some(ViewAction::None)
      }
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
        Some(ViewAction::None)
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
        Some(ViewAction::None)
      }
      _ => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let selected = self.selected_item().map(|item| (item.id, ItemDraft::from(item)));

    match key.code {
      KeyCode::Char(' ') | KeyCode::Enter => {
        if let Some((id, _)) = selected {
          self.controller.toggle_checked(id);
        }
      }
      KeyCode::Char('a') => self.prompt.open_add(),
      KeyCode::Char('e') => {
        if let Some((id, draft)) = selected {
          self.prompt.open_edit(id, &draft);
        }
      }
      KeyCode::Char('d') | KeyCode::Delete => {
        if let Some((id, _)) = selected {
          self.controller.delete_item(id);
        }
      }
      KeyCode::Char('c') => self.controller.clear_checked(),
      KeyCode::Char('r') => self.controller.load(),
      KeyCode::Char('q') | KeyCode::Esc => return Some(ViewAction::Quit),
      _ => return None,
    }
    Some(ViewAction::None)
  }

  pub fn render(&mut self, frame: &mut Frame, area: Rect) {
    let list_area = match self.controller.error() {
      Some(error) => {
        let chunks = Layout::default()
          .direction(Direction::Vertical)
          .constraints([Constraint::Length(3), Constraint::Min(1)])
          .split(area);
        render_error(frame, chunks[0], error);
        chunks[1]
      }
      None => area,
    };

    self.render_list(frame, list_area);
    self.prompt.render_overlay(frame, list_area);
  }

  fn title(&self) -> String {
    if self.controller.is_loading() {
      return " Shopping List (loading...) ".to_string();
    }

    let items = self.controller.items();
    let mut counts = format!(
      "{} items, {} checked",
      items.len(),
      self.controller.checked_count()
    );
    if let Some(cached_at) = self.controller.stale_since() {
      let local = cached_at.with_timezone(&chrono::Local);
      counts.push_str(&format!(", offline copy from {}", local.format("%Y-%m-%d %H:%M")));
    }
    format!(" Shopping List ({}) ", counts)
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.controller.items().len();
    ensure_valid_selection(&mut self.list_state, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 && !self.controller.is_loading() {
      let content = if self.controller.load_state() == LoadState::Error {
        "Nothing to show. Press 'r' to retry."
      } else {
        "Your shopping list is empty. Press 'a' to add an item."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    // Collect items first to avoid borrow conflicts with list_state
    let items: Vec<ListItem> = self.controller.items().iter().map(item_line).collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

fn item_line(item: &ShoppingListItem) -> ListItem<'static> {
  let (mark, name_style, quantity_style) = if item.checked {
    let done = Style::default()
      .fg(Color::DarkGray)
      .add_modifier(Modifier::CROSSED_OUT);
    ("[x]", done, done)
  } else {
    (
      "[ ]",
      Style::default().fg(Color::White),
      Style::default().fg(Color::Cyan),
    )
  };

  ListItem::new(Line::from(vec![
    Span::styled(format!("{} ", mark), Style::default().fg(Color::Yellow)),
    Span::styled(
      format!("{:<width$}", truncate(&item.name, NAME_WIDTH), width = NAME_WIDTH),
      name_style,
    ),
    Span::raw(" "),
    Span::styled(quantity_label(item), quantity_style),
  ]))
}

fn render_error(frame: &mut Frame, area: Rect, error: &str) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red))
    .title(" Error ");
  let paragraph = Paragraph::new(error)
    .block(block)
    .style(Style::default().fg(Color::Red))
    .wrap(Wrap { trim: true });
  frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::ApiClient;
  use crate::cache::{SnapshotCache, SqliteStorage};
  use crate::shopping::list_cache_key;
  use crossterm::event::KeyModifiers;
  use ratatui::backend::TestBackend;
  use ratatui::Terminal;
  use tempfile::TempDir;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn milk() -> ShoppingListItem {
    ShoppingListItem {
      id: 1,
      name: "Milk".into(),
      quantity: "2".into(),
      unit: "L".into(),
      checked: false,
      created_at: None,
    }
  }

  /// View against a server that refuses connections, with `cached` as the
  /// last saved snapshot. Returns once the initial load has failed.
  async fn offline_view(
    cached: &[ShoppingListItem],
  ) -> (TempDir, ShoppingListView<ApiClient, SqliteStorage>) {
    let dir = tempfile::tempdir().unwrap();
    let storage = SqliteStorage::open(&dir.path().join("cache.db")).unwrap();
    let api = ApiClient::new("http://127.0.0.1:9/api").unwrap();
    let cache = SnapshotCache::new(storage, list_cache_key(api.base_url().as_str()));
    cache.save(cached).unwrap();

    let mut view = ShoppingListView::new(ListController::new(api, cache));
    view.controller.settle().await;
    (dir, view)
  }

  fn render_to_string(view: &mut ShoppingListView<ApiClient, SqliteStorage>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
    terminal.draw(|frame| view.render(frame, frame.area())).unwrap();
    terminal
      .backend()
      .buffer()
      .content()
      .iter()
      .map(|cell| cell.symbol())
      .collect()
  }

  #[tokio::test]
  async fn test_offline_view_shows_cached_items_and_error() {
    let (_dir, mut view) = offline_view(&[milk()]).await;
    let screen = render_to_string(&mut view);

    assert!(screen.contains("Failed to load the shopping list"));
    assert!(screen.contains("Milk"));
    assert!(screen.contains("2 L"));
    assert!(screen.contains("offline copy"));
  }

  #[tokio::test]
  async fn test_offline_view_without_cache_offers_retry() {
    let (_dir, mut view) = offline_view(&[]).await;
    let screen = render_to_string(&mut view);
    assert!(screen.contains("Press 'r' to retry"));
  }

  #[tokio::test]
  async fn test_edit_prefills_selected_item() {
    let (_dir, mut view) = offline_view(&[milk()]).await;
    render_to_string(&mut view);

    assert_eq!(view.handle_key(key(KeyCode::Char('e'))), ViewAction::None);
    assert!(view.prompt.is_active());
    assert_eq!(view.prompt.value(), "Milk, 2, L");

    // q is text while the prompt is open
    assert_eq!(view.handle_key(key(KeyCode::Char('q'))), ViewAction::None);
    assert_eq!(view.handle_key(key(KeyCode::Esc)), ViewAction::None);
    assert!(!view.prompt.is_active());
  }

  #[tokio::test]
  async fn test_blank_add_sends_nothing() {
    let (_dir, mut view) = offline_view(&[milk()]).await;

    view.handle_key(key(KeyCode::Char('a')));
    view.handle_key(key(KeyCode::Char(' ')));
    view.handle_key(key(KeyCode::Enter));

    assert!(!view.prompt.is_active());
    assert!(!view.controller.poll());
    assert_eq!(view.controller.items(), &[milk()]);
  }

  #[tokio::test]
  async fn test_q_quits() {
    let (_dir, mut view) = offline_view(&[]).await;
    assert_eq!(view.handle_key(key(KeyCode::Char('q'))), ViewAction::Quit);
  }
}
