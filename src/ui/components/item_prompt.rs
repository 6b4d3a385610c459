use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::shopping::ItemDraft;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// What a submitted prompt applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTarget {
  Add,
  Edit(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
  /// Enter pressed; the draft is parsed but not validated
  Submitted {
    target: PromptTarget,
    draft: ItemDraft,
  },
}

/// Modal one-line prompt for adding or editing an item.
///
/// Input follows `name[, quantity[, unit]]`, with `\,` for a comma inside a
/// field. While open, the prompt swallows every key so list bindings don't
/// fire while typing.
#[derive(Debug, Clone, Default)]
pub struct ItemPrompt {
  input: TextInput,
  target: Option<PromptTarget>,
}

impl ItemPrompt {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.target.is_some()
  }

  pub fn value(&self) -> &str {
    self.input.value()
  }

  pub fn open_add(&mut self) {
    self.target = Some(PromptTarget::Add);
    self.input.clear();
  }

  /// Open prefilled with the item's current fields
  pub fn open_edit(&mut self, id: i32, current: &ItemDraft) {
    self.target = Some(PromptTarget::Edit(id));
    self.input = TextInput::with_value(current.to_input());
  }

  fn close(&mut self) {
    self.target = None;
    self.input.clear();
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<PromptEvent> {
    let Some(target) = self.target else {
      return KeyResult::NotHandled;
    };

    match self.input.handle_key(key) {
      InputResult::Submitted(value) => {
        self.close();
        KeyResult::Event(PromptEvent::Submitted {
          target,
          draft: ItemDraft::parse(&value),
        })
      }
      InputResult::Cancelled => {
        self.close();
        KeyResult::Handled
      }
      InputResult::Consumed | InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the prompt box over the top of `area` if open
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let Some(target) = self.target else {
      return;
    };

    let width = (area.width * 60 / 100).clamp(30, 60);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, 4).intersection(area);
    frame.render_widget(Clear, overlay_area);

    let title = match target {
      PromptTarget::Add => " Add item ",
      PromptTarget::Edit(_) => " Edit item ",
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(title);

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let (before, after) = self.input.split_at_cursor();
    let mut rest = after.chars();
    let under_cursor = rest.next().map(String::from).unwrap_or_else(|| " ".into());

    let lines = vec![
      Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Yellow)),
        Span::raw(before),
        Span::styled(under_cursor, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(rest.as_str()),
      ]),
      Line::from(Span::styled(
        "name, quantity, unit   Enter save   Esc cancel",
        Style::default().fg(Color::DarkGray),
      )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
  }
}
