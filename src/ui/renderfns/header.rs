use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with logo and the API host in use
pub fn draw_header(frame: &mut Frame, area: Rect, api_url: &str) {
  let host = extract_host(api_url);

  let header = Line::from(vec![
    Span::styled(" larder ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", host), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(" shopping list ", Style::default().fg(Color::Yellow).bold()),
  ]);

  let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Host (and port) part of the API URL
fn extract_host(url: &str) -> &str {
  let rest = url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url);
  rest.split('/').next().unwrap_or(rest)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_host() {
    assert_eq!(extract_host("http://localhost:3000/api/"), "localhost:3000");
    assert_eq!(
      extract_host("https://larder.example.com/api"),
      "larder.example.com"
    );
    assert_eq!(extract_host("backend:3000"), "backend:3000");
  }
}
