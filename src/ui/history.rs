//! Pick history view: most recent pick first, with timestamps where the
//! stored entry has one.

use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the pick history view.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = if app.history.is_empty() {
        vec![ListItem::new("No picks yet.")]
    } else {
        app.history
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let when = entry
                    .picked_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                let text = if when.is_empty() {
                    entry.item.name.clone()
                } else {
                    format!("{}  {}", when, entry.item.name)
                };
                let style = if i == app.history_selected {
                    Style::default().bg(Color::DarkGray).fg(Color::White)
                } else {
                    Style::default()
                };
                ListItem::new(text).style(style)
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" History ({}) ", app.history.len())),
    );
    f.render_widget(list, area);
}
