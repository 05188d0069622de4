//! Help overlay listing every keybinding per view.

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::render::centered_rect;

const HELP_TEXT: &str = "\
Picker view
  type          Search catalogs / enter an item name
  Enter         Add highlighted result, or typed text as a custom item
  Up/Down       Move between dropdown results and collection items
  Ctrl+s        Spin
  Ctrl+d        Remove the highlighted item
  Ctrl+x        Clear the collection
  Esc           Clear the search box / dismiss the winner

Winner screen
  r             Spin again
  l             Add the winner to a saved list
  Esc           Back to the collection

Lists view (Tab from picker)
  n             New list
  d             Delete the selected list
  j/k, Up/Down  Navigate

History view (Tab from lists)
  c             Clear history
  j/k, Up/Down  Navigate

Everywhere
  Tab           Next view
  F1            Toggle this help
  Ctrl+q        Quit";

/// Render the help overlay centered on screen.
pub fn render(f: &mut Frame, area: Rect) {
    let height = HELP_TEXT.lines().count() as u16 + 2;
    let overlay = centered_rect(area, 64, height);
    if overlay.width < 30 || overlay.height < 8 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(HELP_TEXT)
        .block(Block::default().borders(Borders::ALL).title(" Help (Esc to close) "));
    f.render_widget(paragraph, overlay);
}
