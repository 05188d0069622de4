//! Input handling for the TUI.
//!
//! This module processes keyboard input and dispatches to the appropriate
//! handler based on current view and overlay state. The picker view keeps
//! the search box always focused, so command keys there live on Ctrl.

use crate::app::{App, AppEvent, ConfirmAction, View};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::loop_runner::spawn_spin;
use super::Action;

/// Main input dispatch function.
///
/// Routes input to the appropriate handler based on current overlays and view.
pub(super) async fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    // Global quit regardless of mode
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('q') {
        return Ok(Action::Quit);
    }

    // Handle help overlay input first (captures all keys when visible)
    if app.show_help {
        return Ok(handle_help_input(app, code));
    }

    // Handle confirmation dialog input (captures all keys when visible)
    if app.pending_confirm.is_some() {
        return handle_confirm_input(app, code).await;
    }

    // Add-to-list chooser over the reveal screen
    if app.list_chooser.is_some() {
        return handle_list_chooser_input(app, code).await;
    }

    // New-list name entry in the lists view
    if app.list_name_input.is_some() {
        return handle_list_name_input(app, code).await;
    }

    match app.view {
        View::Picker => handle_picker_input(app, code, modifiers, event_tx).await,
        View::Lists => handle_lists_input(app, code).await,
        View::History => handle_history_input(app, code),
    }
}

/// Handle input while the help overlay is visible.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::F(1) => {
            app.show_help = false;
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input while a confirmation dialog is visible.
///
/// `y`/Enter confirms, `n`/Esc declines. Declining is always a pure no-op
/// on the underlying data.
async fn handle_confirm_input(app: &mut App, code: KeyCode) -> Result<Action> {
    let confirmed = match code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => true,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
        _ => return Ok(Action::Continue),
    };

    let Some(action) = app.pending_confirm.take() else {
        return Ok(Action::Continue);
    };
    if !confirmed {
        // A declined duplicate still consumes the pending input, exactly
        // like a confirmed one
        if let ConfirmAction::DuplicateAdd { .. } = action {
            app.clear_search_box();
        }
        return Ok(Action::Continue);
    }

    match action {
        ConfirmAction::DuplicateAdd { item } => {
            app.collection.add(item);
            app.clear_search_box();
            app.set_status("Duplicate added");
        }
        ConfirmAction::ClearItems => {
            app.collection.clear();
            app.picker.reset();
            app.selected_item = 0;
            app.set_status("Collection cleared");
        }
        ConfirmAction::DeleteList { id, name } => {
            app.db.delete_list(&id).await?;
            app.reload_lists().await?;
            app.set_status(format!("Deleted list \"{}\"", name));
        }
        ConfirmAction::ClearHistory => {
            app.db.clear_history().await?;
            app.reload_history().await?;
            app.set_status("History cleared");
        }
    }
    Ok(Action::Continue)
}

/// Handle input while the add-to-list chooser is open over the reveal screen.
async fn handle_list_chooser_input(app: &mut App, code: KeyCode) -> Result<Action> {
    match code {
        KeyCode::Esc => {
            app.list_chooser = None;
        }
        KeyCode::Up => app.nav_up(),
        KeyCode::Down => app.nav_down(),
        KeyCode::Enter => {
            let chosen = app.list_chooser.take().and_then(|i| app.lists.get(i));
            let (Some(list), Some(item)) = (chosen, app.picker.selected()) else {
                return Ok(Action::Continue);
            };
            let list_id = list.id.clone();
            let list_name = list.name.clone();
            let item = item.clone();

            if app.db.add_item_to_list(&list_id, &item).await? {
                app.reload_lists().await?;
                app.set_status(format!("Added to \"{}\"", list_name));
            } else {
                // Already present by name, or the list vanished; either way
                // the list is unchanged
                app.set_status(format!("\"{}\" is already in \"{}\"", item.name, list_name));
            }
        }
        _ => {}
    }
    Ok(Action::Continue)
}

/// Handle input while typing a new list name.
async fn handle_list_name_input(app: &mut App, code: KeyCode) -> Result<Action> {
    match code {
        KeyCode::Esc => {
            app.list_name_input = None;
        }
        KeyCode::Enter => {
            let name = app.list_name_input.take().unwrap_or_default();
            match app.db.create_list(&name).await? {
                Ok(_) => {
                    app.reload_lists().await?;
                    app.set_status("List created");
                }
                Err(e) => {
                    // Empty name: keep the prompt open for another attempt
                    app.set_status(e.to_string());
                    app.list_name_input = Some(name);
                }
            }
        }
        KeyCode::Backspace => {
            if let Some(input) = app.list_name_input.as_mut() {
                input.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(input) = app.list_name_input.as_mut() {
                input.push(c);
            }
        }
        _ => {}
    }
    Ok(Action::Continue)
}

/// Handle input in the picker view.
///
/// Plain characters feed the search box; everything else is arrows, Enter,
/// and Ctrl-chords. While an item is revealed, a few plain keys act on the
/// reveal screen instead of the search box.
async fn handle_picker_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    // Ctrl chords work in every picker sub-state
    if modifiers.contains(KeyModifiers::CONTROL) {
        match code {
            KeyCode::Char('s') => {
                start_spin(app, event_tx);
                return Ok(Action::Continue);
            }
            KeyCode::Char('x') => {
                if app.collection.is_empty() {
                    return Ok(Action::Continue);
                }
                if app.confirm_clear_items {
                    app.pending_confirm = Some(ConfirmAction::ClearItems);
                } else {
                    app.collection.clear();
                    app.picker.reset();
                    app.selected_item = 0;
                    app.set_status("Collection cleared");
                }
                return Ok(Action::Continue);
            }
            KeyCode::Char('d') => {
                remove_selected_item(app);
                return Ok(Action::Continue);
            }
            _ => return Ok(Action::Continue),
        }
    }

    // Reveal screen takes over a few plain keys
    if app.picker.selected().is_some() {
        match code {
            KeyCode::Char('r') => {
                start_spin(app, event_tx);
                return Ok(Action::Continue);
            }
            KeyCode::Char('l') => {
                if app.lists.is_empty() {
                    app.set_status("No lists yet (create one in the Lists view)");
                } else {
                    app.list_chooser = Some(0);
                }
                return Ok(Action::Continue);
            }
            KeyCode::Esc => {
                app.picker.reset();
                return Ok(Action::Continue);
            }
            _ => {}
        }
    }

    match code {
        KeyCode::Tab => {
            app.view = View::Lists;
            app.reload_lists().await?;
        }
        KeyCode::F(1) => {
            app.show_help = true;
        }
        KeyCode::Esc => {
            app.clear_search_box();
        }
        KeyCode::Up => app.nav_up(),
        KeyCode::Down => app.nav_down(),
        KeyCode::Enter => match app.search_selected {
            Some(i) => {
                if let Some(item) = app.search_results.get(i).cloned() {
                    app.add_catalog_item(item);
                }
            }
            None => app.submit_custom_item(),
        },
        KeyCode::Backspace => {
            app.search_input.pop();
            note_search_keystroke(app);
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            note_search_keystroke(app);
        }
        _ => {}
    }
    Ok(Action::Continue)
}

/// Handle input in the saved lists view.
async fn handle_lists_input(app: &mut App, code: KeyCode) -> Result<Action> {
    match code {
        KeyCode::Tab => {
            app.view = View::History;
            app.reload_history().await?;
        }
        KeyCode::Esc => {
            app.view = View::Picker;
        }
        KeyCode::F(1) => {
            app.show_help = true;
        }
        KeyCode::Up | KeyCode::Char('k') => app.nav_up(),
        KeyCode::Down | KeyCode::Char('j') => app.nav_down(),
        KeyCode::Char('n') => {
            app.list_name_input = Some(String::new());
        }
        KeyCode::Char('d') => {
            if let Some(list) = app.selected_list() {
                app.pending_confirm = Some(ConfirmAction::DeleteList {
                    id: list.id.clone(),
                    name: list.name.clone(),
                });
            }
        }
        _ => {}
    }
    Ok(Action::Continue)
}

/// Handle input in the pick history view.
fn handle_history_input(app: &mut App, code: KeyCode) -> Result<Action> {
    match code {
        KeyCode::Tab | KeyCode::Esc => {
            app.view = View::Picker;
        }
        KeyCode::F(1) => {
            app.show_help = true;
        }
        KeyCode::Up | KeyCode::Char('k') => app.nav_up(),
        KeyCode::Down | KeyCode::Char('j') => app.nav_down(),
        KeyCode::Char('c') => {
            if !app.history.is_empty() {
                app.pending_confirm = Some(ConfirmAction::ClearHistory);
            }
        }
        _ => {}
    }
    Ok(Action::Continue)
}

/// Record a keystroke in the search box and (re)arm the debounce timer.
fn note_search_keystroke(app: &mut App) {
    app.search_selected = None;
    app.search_debounce = Some(tokio::time::Instant::now());
    app.pending_search = Some(app.search_input.clone());
}

/// Start a spin episode if the collection allows one.
fn start_spin(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.picker.is_spinning() {
        return;
    }
    if app.collection.is_empty() {
        app.set_status("Add at least one item first");
        return;
    }
    match app.picker.pick(app.collection.snapshot()) {
        Some(plan) => spawn_spin(app, plan, event_tx),
        None => {}
    }
}

/// Remove the highlighted collection item.
fn remove_selected_item(app: &mut App) {
    if app.collection.is_empty() {
        return;
    }
    match app.collection.remove(app.selected_item) {
        Ok(item) => {
            app.clamp_selections();
            app.set_status(format!("Removed \"{}\"", item.name));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Remove with stale selection index");
            app.clamp_selections();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::{Database, Item};

    async fn test_app() -> (App, mpsc::Sender<AppEvent>, mpsc::Receiver<AppEvent>) {
        let db = Database::open(":memory:").await.unwrap();
        let app = App::new(db, &Config::default()).unwrap();
        let (tx, rx) = mpsc::channel(32);
        (app, tx, rx)
    }

    #[tokio::test]
    async fn ctrl_q_quits_from_any_state() {
        let (mut app, tx, _rx) = test_app().await;
        app.pending_confirm = Some(ConfirmAction::ClearItems);
        let action = handle_input(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL, &tx)
            .await
            .unwrap();
        assert!(matches!(action, Action::Quit));
    }

    #[tokio::test]
    async fn typing_feeds_search_box_and_arms_debounce() {
        let (mut app, tx, _rx) = test_app().await;
        handle_input(&mut app, KeyCode::Char('z'), KeyModifiers::NONE, &tx)
            .await
            .unwrap();
        handle_input(&mut app, KeyCode::Char('e'), KeyModifiers::NONE, &tx)
            .await
            .unwrap();

        assert_eq!(app.search_input, "ze");
        assert!(app.search_debounce.is_some());
        assert_eq!(app.pending_search.as_deref(), Some("ze"));
    }

    #[tokio::test]
    async fn enter_without_dropdown_selection_adds_custom_item() {
        let (mut app, tx, _rx) = test_app().await;
        app.search_input = "Pizza Night".to_string();

        handle_input(&mut app, KeyCode::Enter, KeyModifiers::NONE, &tx)
            .await
            .unwrap();

        assert_eq!(app.collection.len(), 1);
        assert_eq!(app.collection.items()[0].name, "Pizza Night");
    }

    #[tokio::test]
    async fn enter_on_dropdown_selection_adds_catalog_item() {
        let (mut app, tx, _rx) = test_app().await;
        app.search_results = vec![Item::custom("From Catalog")];
        app.search_selected = Some(0);

        handle_input(&mut app, KeyCode::Enter, KeyModifiers::NONE, &tx)
            .await
            .unwrap();

        assert_eq!(app.collection.len(), 1);
        assert_eq!(app.collection.items()[0].name, "From Catalog");
        assert!(app.search_input.is_empty());
    }

    #[tokio::test]
    async fn spin_with_empty_collection_sets_status() {
        let (mut app, tx, _rx) = test_app().await;

        handle_input(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL, &tx)
            .await
            .unwrap();

        assert!(app.picker.is_idle());
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg.as_ref(), "Add at least one item first");
    }

    #[tokio::test]
    async fn ctrl_s_starts_spinning_with_items() {
        let (mut app, tx, mut rx) = test_app().await;
        app.collection.add(Item::custom("a"));

        handle_input(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL, &tx)
            .await
            .unwrap();

        assert!(app.picker.is_spinning());
        // The spawned animation task eventually produces frames
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, AppEvent::SpinFrame { .. }));
    }

    #[tokio::test]
    async fn spin_while_spinning_is_ignored() {
        let (mut app, tx, _rx) = test_app().await;
        app.collection.add(Item::custom("a"));
        let gen_before;
        {
            handle_input(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL, &tx)
                .await
                .unwrap();
            gen_before = app.picker.generation();
        }

        handle_input(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL, &tx)
            .await
            .unwrap();

        assert_eq!(app.picker.generation(), gen_before);
    }

    #[tokio::test]
    async fn confirm_clear_empties_collection_and_resets_picker() {
        let (mut app, tx, _rx) = test_app().await;
        app.collection.add(Item::custom("a"));
        app.pending_confirm = Some(ConfirmAction::ClearItems);

        handle_input(&mut app, KeyCode::Char('y'), KeyModifiers::NONE, &tx)
            .await
            .unwrap();

        assert!(app.collection.is_empty());
        assert!(app.picker.is_idle());
    }

    #[tokio::test]
    async fn declined_duplicate_clears_pending_input() {
        let (mut app, tx, _rx) = test_app().await;
        app.search_input = "Pizza".to_string();
        handle_input(&mut app, KeyCode::Enter, KeyModifiers::NONE, &tx)
            .await
            .unwrap();
        app.search_input = "pizza".to_string();
        handle_input(&mut app, KeyCode::Enter, KeyModifiers::NONE, &tx)
            .await
            .unwrap();
        assert!(app.pending_confirm.is_some());
        app.pending_search = Some("pizza".to_string());

        handle_input(&mut app, KeyCode::Char('n'), KeyModifiers::NONE, &tx)
            .await
            .unwrap();

        assert_eq!(app.collection.len(), 1);
        assert!(app.search_input.is_empty());
        assert!(app.pending_search.is_none());
    }

    #[tokio::test]
    async fn declined_confirmation_changes_nothing() {
        let (mut app, tx, _rx) = test_app().await;
        app.collection.add(Item::custom("a"));
        app.pending_confirm = Some(ConfirmAction::ClearItems);

        handle_input(&mut app, KeyCode::Esc, KeyModifiers::NONE, &tx)
            .await
            .unwrap();

        assert_eq!(app.collection.len(), 1);
        assert!(app.pending_confirm.is_none());
    }

    #[tokio::test]
    async fn delete_list_confirmation_removes_list() {
        let (mut app, tx, _rx) = test_app().await;
        let id = app.db.create_list("Friday").await.unwrap().unwrap();
        app.reload_lists().await.unwrap();
        app.pending_confirm = Some(ConfirmAction::DeleteList {
            id,
            name: "Friday".to_string(),
        });

        handle_input(&mut app, KeyCode::Char('y'), KeyModifiers::NONE, &tx)
            .await
            .unwrap();

        assert!(app.lists.is_empty());
        assert!(app.db.get_lists().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_name_entry_creates_list_on_enter() {
        let (mut app, tx, _rx) = test_app().await;
        app.view = View::Lists;
        app.list_name_input = Some(String::new());

        for c in "Movie Night".chars() {
            handle_input(&mut app, KeyCode::Char(c), KeyModifiers::NONE, &tx)
                .await
                .unwrap();
        }
        handle_input(&mut app, KeyCode::Enter, KeyModifiers::NONE, &tx)
            .await
            .unwrap();

        assert!(app.list_name_input.is_none());
        assert_eq!(app.lists.len(), 1);
        assert_eq!(app.lists[0].name, "Movie Night");
    }

    #[tokio::test]
    async fn empty_list_name_keeps_prompt_open() {
        let (mut app, tx, _rx) = test_app().await;
        app.view = View::Lists;
        app.list_name_input = Some("   ".to_string());

        handle_input(&mut app, KeyCode::Enter, KeyModifiers::NONE, &tx)
            .await
            .unwrap();

        assert!(app.list_name_input.is_some());
        assert!(app.db.get_lists().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_selected_item_shrinks_collection() {
        let (mut app, tx, _rx) = test_app().await;
        app.collection.add(Item::custom("a"));
        app.collection.add(Item::custom("b"));
        app.selected_item = 1;

        handle_input(&mut app, KeyCode::Char('d'), KeyModifiers::CONTROL, &tx)
            .await
            .unwrap();

        assert_eq!(app.collection.len(), 1);
        assert_eq!(app.collection.items()[0].name, "a");
        assert_eq!(app.selected_item, 0);
    }

    #[tokio::test]
    async fn clear_history_confirmation_empties_journal() {
        let (mut app, tx, _rx) = test_app().await;
        app.db.record_pick(&Item::custom("a")).await.unwrap();
        app.reload_history().await.unwrap();
        app.view = View::History;
        app.pending_confirm = Some(ConfirmAction::ClearHistory);

        handle_input(&mut app, KeyCode::Enter, KeyModifiers::NONE, &tx)
            .await
            .unwrap();

        assert!(app.history.is_empty());
        assert!(app.db.get_history().await.unwrap().is_empty());
    }
}
