use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

const HINTS: &[(&str, &str)] = &[
  ("space", "toggle"),
  ("a", "add"),
  ("e", "edit"),
  ("d", "delete"),
  ("c", "clear checked"),
  ("r", "reload"),
  ("q", "quit"),
];

/// Draw the footer: the last server confirmation if there is one,
/// key hints otherwise
pub fn draw_footer(frame: &mut Frame, area: Rect, notice: Option<&str>) {
  let line = match notice {
    Some(notice) => Line::from(Span::styled(
      format!(" {} ", notice),
      Style::default().fg(Color::Green),
    )),
    None => {
      let mut spans = vec![Span::raw(" ")];
      for (key, label) in HINTS {
        spans.push(Span::styled(format!("<{}>", key), Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
          format!(" {}  ", label),
          Style::default().fg(Color::DarkGray),
        ));
      }
      Line::from(spans)
    }
  };

  let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
