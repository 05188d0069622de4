//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! view based on application state, and draws modal overlays on top.

use crate::app::{App, ConfirmAction, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{help, history, lists, status, wheel};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render dispatch function.
///
/// Routes to the appropriate view renderer based on current application state.
/// Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Minimum terminal size check for usable UI
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match app.view {
        View::Picker => wheel::render(f, app, chunks[0]),
        View::Lists => lists::render(f, app, chunks[0]),
        View::History => history::render(f, app, chunks[0]),
    }
    status::render(f, app, chunks[1]);

    // Render help overlay on top of any view when active
    if app.show_help {
        help::render(f, area);
    }

    // Render the add-to-list chooser on top of the reveal screen
    if app.list_chooser.is_some() {
        render_list_chooser_overlay(f, app);
    }

    // Render confirmation dialog on top of any view when active
    if let Some(ref confirm) = app.pending_confirm {
        render_confirm_overlay(f, confirm);
    }
}

/// Compute a centered overlay rect within `area`.
pub(super) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render a confirmation dialog overlay centered on screen.
fn render_confirm_overlay(f: &mut Frame, confirm: &ConfirmAction) {
    let area = f.area();

    let text = match confirm {
        ConfirmAction::DuplicateAdd { item } => {
            format!(
                "\"{}\" is already in the collection.\n\nAdd it again?\n\n(y) Confirm  (n/Esc) Cancel",
                item.name
            )
        }
        ConfirmAction::ClearItems => {
            "Remove all items from the collection?\n\n(y) Confirm  (n/Esc) Cancel".to_string()
        }
        ConfirmAction::DeleteList { name, .. } => {
            format!(
                "Delete \"{}\"?\n\nAll items in it will be removed.\n\n(y) Confirm  (n/Esc) Cancel",
                name
            )
        }
        ConfirmAction::ClearHistory => {
            "Erase the entire pick history?\n\n(y) Confirm  (n/Esc) Cancel".to_string()
        }
    };

    let overlay = centered_rect(area, 50, 7);
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Confirm "))
        .alignment(Alignment::Center);

    f.render_widget(paragraph, overlay);
}

/// Render the add-to-list chooser overlay centered on screen.
fn render_list_chooser_overlay(f: &mut Frame, app: &App) {
    let area = f.area();
    let Some(selected) = app.list_chooser else {
        return;
    };

    let items: String = app
        .lists
        .iter()
        .enumerate()
        .map(|(i, list)| {
            if i == selected {
                format!("> {}", list.name)
            } else {
                format!("  {}", list.name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    let text = format!("{}\n\n(Enter) Add  (Esc) Cancel", items);

    let content_lines = text.lines().count() as u16 + 2; // +2 for borders
    let overlay = centered_rect(area, 45, content_lines);
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Add to List "),
    );

    f.render_widget(paragraph, overlay);
}
