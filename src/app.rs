use crate::api::ShoppingListApi;
use crate::cache::CacheStorage;
use crate::event::{Event, EventHandler};
use crate::shopping::ListController;
use crate::ui::{self, ShoppingListView, ViewAction};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::{stdout, Stdout};
use std::time::Duration;

/// Terminal shopping list client
pub struct App<A: ShoppingListApi, S: CacheStorage> {
  view: ShoppingListView<A, S>,
  api_url: String,
  should_quit: bool,
}

impl<A: ShoppingListApi, S: CacheStorage> App<A, S> {
  /// Build the app; the first list load starts immediately.
  pub fn new(controller: ListController<A, S>, api_url: impl Into<String>) -> Self {
    Self {
      view: ShoppingListView::new(controller),
      api_url: api_url.into(),
      should_quit: false,
    }
  }

  pub fn api_url(&self) -> &str {
    &self.api_url
  }

  pub fn view_mut(&mut self) -> &mut ShoppingListView<A, S> {
    &mut self.view
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.run_loop(&mut terminal).await;

    // Restore the terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(250));

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.view.tick(),
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if self.view.handle_key(key) == ViewAction::Quit {
      self.should_quit = true;
    }
  }
}
