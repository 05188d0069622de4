//! Saved lists view: list names on the left, the selected list's items on
//! the right.

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Render the saved lists view.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    render_names(f, app, chunks[0]);
    render_members(f, app, chunks[1]);

    // Name entry prompt replaces the bottom of the names panel
    if let Some(input) = &app.list_name_input {
        let prompt_area = Rect {
            x: chunks[0].x,
            y: chunks[0].y + chunks[0].height.saturating_sub(3),
            width: chunks[0].width,
            height: 3.min(chunks[0].height),
        };
        let prompt = Paragraph::new(format!("> {}_", input)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" New list name "),
        );
        f.render_widget(prompt, prompt_area);
    }
}

fn render_names(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = if app.lists.is_empty() {
        vec![ListItem::new("No lists yet. Press (n) to create one.")]
    } else {
        app.lists
            .iter()
            .enumerate()
            .map(|(i, list)| {
                let style = if i == app.selected_list {
                    Style::default().bg(Color::DarkGray).fg(Color::White)
                } else {
                    Style::default()
                };
                ListItem::new(format!("{} ({})", list.name, list.items.len())).style(style)
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" Lists ({}) ", app.lists.len())),
    );
    f.render_widget(list, area);
}

fn render_members(f: &mut Frame, app: &App, area: Rect) {
    let (title, items) = match app.selected_list() {
        Some(list) if !list.items.is_empty() => (
            format!(" {} ", list.name),
            list.items
                .iter()
                .map(|item| ListItem::new(item.name.clone()))
                .collect(),
        ),
        Some(list) => (
            format!(" {} ", list.name),
            vec![ListItem::new("Empty list")],
        ),
        None => (" Items ".to_string(), Vec::new()),
    };

    let list =
        List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}
