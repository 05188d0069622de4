use crate::app::{App, View};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // Status bar needs at least 1 char width to be meaningful
    if area.width < 1 || area.height < 1 {
        return;
    }

    // Use Cow to avoid allocations for static strings and borrowed messages
    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.view {
            View::Picker => Cow::Borrowed(
                "Type to search/add | [Ctrl+s]spin [Ctrl+d]remove [Tab]lists [F1]help [Ctrl+q]uit",
            ),
            View::Lists => {
                Cow::Borrowed("[n]ew [d]elete [j/k]nav [Tab]history [Esc]back [Ctrl+q]uit")
            }
            View::History => Cow::Borrowed("[c]lear [j/k]nav [Esc]back [Ctrl+q]uit"),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}
