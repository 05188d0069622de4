//! Picker view widgets: search box, catalog dropdown, collection list, and
//! the spin/reveal panel.

use crate::app::App;
use crate::storage::Item;
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Render the picker view.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // Dropdown height tracks result count, capped so the collection stays
    // visible
    let dropdown_height = if app.search_results.is_empty() {
        0
    } else {
        app.search_results.len().min(8) as u16 + 2
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(dropdown_height),
            Constraint::Min(0),
            Constraint::Length(7),
        ])
        .split(area);

    render_search_box(f, app, chunks[0]);
    if dropdown_height > 0 {
        render_dropdown(f, app, chunks[1]);
    }
    render_collection(f, app, chunks[2]);
    render_spin_panel(f, app, chunks[3]);
}

fn render_search_box(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.search_in_flight {
        " Search catalogs (searching...) "
    } else {
        " Search catalogs / add item "
    };

    let input = Paragraph::new(format!("> {}_", app.search_input)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(if app.search_selected.is_none() {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            })
            .title(title),
    );
    f.render_widget(input, area);
}

fn render_dropdown(f: &mut Frame, app: &App, area: Rect) {
    let line_width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .search_results
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if app.search_selected == Some(i) {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else {
                Style::default()
            };
            let text = truncate_to_width(&describe_item(item), line_width).into_owned();
            ListItem::new(Line::from(Span::styled(text, style)))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Results ({}) ", app.search_results.len())),
    );
    f.render_widget(list, area);
}

fn render_collection(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = if app.collection.is_empty() {
        vec![ListItem::new(
            "No items yet. Type a name and press Enter, or search the catalogs.",
        )]
    } else {
        let line_width = area.width.saturating_sub(2) as usize;
        app.collection
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let style = if i == app.selected_item && app.search_selected.is_none() {
                    Style::default().bg(Color::DarkGray).fg(Color::White)
                } else {
                    Style::default()
                };
                let text = truncate_to_width(&describe_item(item), line_width).into_owned();
                ListItem::new(Line::from(Span::styled(text, style)))
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Items ({}) ", app.collection.len())),
    );
    f.render_widget(list, area);
}

/// Render the spin/reveal panel at the bottom of the picker view.
///
/// Idle shows a hint, Spinning shows the current animation frame, Revealed
/// shows the winner.
fn render_spin_panel(f: &mut Frame, app: &App, area: Rect) {
    let (title, text, style) = if let Some(item) = app.picker.selected() {
        (
            " Winner ",
            format!(
                "{}\n\n(r) Spin again  (l) Add to list  (Esc) Done",
                describe_item(item)
            ),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    } else if let Some(item) = app.picker.current_frame_item() {
        (
            " Spinning... ",
            item.name.clone(),
            Style::default().fg(Color::Yellow),
        )
    } else {
        (
            " Spin ",
            "(Ctrl+s) Spin  (Ctrl+d) Remove item  (Ctrl+x) Clear all".to_string(),
            Style::default(),
        )
    };

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Center)
        .style(style);
    f.render_widget(paragraph, area);
}

/// One-line item description: name plus any release year and kind tag.
fn describe_item(item: &Item) -> String {
    let mut out = item.name.clone();
    if let Some(date) = &item.release_date {
        let year = date.split('-').next().unwrap_or(date);
        out.push_str(&format!(" ({})", year));
    }
    if let Some(kind) = &item.kind {
        out.push_str(&format!(" [{}]", kind.label()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ItemKind;

    #[test]
    fn describe_item_includes_year_and_kind() {
        let mut item = Item::custom("Dune");
        item.release_date = Some("2021-10-22".to_string());
        item.kind = Some(ItemKind::Movie);
        assert_eq!(describe_item(&item), "Dune (2021) [MOVIE]");
    }

    #[test]
    fn describe_item_plain_custom_entry() {
        let item = Item::custom("Pizza Night");
        assert_eq!(describe_item(&item), "Pizza Night");
    }
}
