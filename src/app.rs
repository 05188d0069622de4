use crate::catalog::{CatalogClient, QueryCache};
use crate::collection::{AddOutcome, CollectionError, ItemCollection};
use crate::config::Config;
use crate::picker::Picker;
use crate::storage::{Database, HistoryEntry, Item, SavedList};
use anyhow::Result;
use std::borrow::Cow;
use tokio::time::Instant;

// ============================================================================
// View Enum
// ============================================================================

/// Current view mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Picker,  // Collection, search box, spin/reveal
    Lists,   // Saved lists browser
    History, // Past picks journal
}

// ============================================================================
// Confirmation Dialog
// ============================================================================

/// Pending confirmation action for destructive or ambiguous operations.
///
/// When set, the UI renders a confirmation overlay and input is routed
/// to the confirmation handler instead of normal dispatch.
pub enum ConfirmAction {
    /// An item with the same name is already in the collection; add a
    /// second copy anyway. Holds the full item so catalog metadata
    /// survives the confirmation round-trip.
    DuplicateAdd { item: Item },
    /// Empty the whole collection.
    ClearItems,
    /// Delete a saved list and everything in it.
    DeleteList { id: String, name: String },
    /// Erase the pick history.
    ClearHistory,
}

// ============================================================================
// Background Task Events
// ============================================================================

/// Events from background tasks
pub enum AppEvent {
    /// Catalog search completed.
    ///
    /// Fields:
    /// - `query`: The raw query text that was searched
    /// - `generation`: Generation counter when the search was spawned
    ///   (for stale result detection)
    /// - `results`: Merged provider results; provider failures already
    ///   degraded to empty upstream
    SearchCompleted {
        query: String,
        generation: u64,
        results: Vec<Item>,
    },
    /// One frame of the spin animation elapsed.
    SpinFrame { generation: u64, frame: usize },
    /// The spin animation finished; time to choose and record the winner.
    SpinCompleted { generation: u64 },
    /// A background task panicked.
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub db: Database,
    pub catalog: CatalogClient,

    // Core domain
    pub collection: ItemCollection,
    pub picker: Picker,
    /// Session-scoped cache of catalog searches, keyed by normalized query.
    pub query_cache: QueryCache,

    // UI State
    pub view: View,
    pub selected_item: usize,

    // Search box
    pub search_input: String,
    /// Results currently shown in the dropdown.
    pub search_results: Vec<Item>,
    /// Highlighted dropdown row, or None when focus is on the input text.
    pub search_selected: Option<usize>,
    /// True while a search task is running (spinner indicator).
    pub search_in_flight: bool,

    /// Debounce timer for search: the query fires once the input has been
    /// idle this long.
    pub search_debounce: Option<Instant>,
    /// Query text waiting for the debounce window to elapse.
    pub pending_search: Option<String>,
    pub search_debounce_ms: u64,

    /// Generation counter for search to handle rapid typing.
    ///
    /// Incremented each time a new search is spawned. When handling
    /// SearchCompleted, we reject responses where generation doesn't match,
    /// preventing stale results from overwriting newer searches.
    pub search_generation: u64,

    /// Handle to the current search task for cancellation.
    pub search_handle: Option<tokio::task::JoinHandle<()>>,

    /// Handle to the current spin animation task for cancellation.
    pub spin_handle: Option<tokio::task::JoinHandle<()>>,

    // Lists view
    pub lists: Vec<SavedList>,
    pub selected_list: usize,
    /// In-progress name when creating a new list, None otherwise.
    pub list_name_input: Option<String>,

    // History view
    pub history: Vec<HistoryEntry>,
    pub history_selected: usize,

    /// Highlighted list index in the add-to-list chooser shown over the
    /// reveal screen, or None when the chooser is closed.
    pub list_chooser: Option<usize>,

    /// Whether clearing the collection asks for confirmation.
    pub confirm_clear_items: bool,

    /// Offline mode: debounced queries never reach the catalogs, the
    /// search box only feeds custom entries.
    pub offline: bool,

    // Status message with expiry; Cow avoids allocation for static literals
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Pending confirmation dialog.
    pub pending_confirm: Option<ConfirmAction>,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,

    /// Whether the help overlay is currently displayed.
    pub show_help: bool,
}

impl App {
    pub fn new(db: Database, config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(std::time::Duration::from_secs(30))
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        let catalog = CatalogClient::new(http_client, config.catalog_settings());

        Ok(Self {
            db,
            catalog,
            collection: ItemCollection::new(),
            picker: Picker::new(config.spin_params()),
            query_cache: QueryCache::new(),
            view: View::Picker,
            selected_item: 0,
            search_input: String::new(),
            search_results: Vec::new(),
            search_selected: None,
            search_in_flight: false,
            search_debounce: None,
            pending_search: None,
            search_debounce_ms: config.search_debounce_ms,
            search_generation: 0,
            search_handle: None,
            spin_handle: None,
            lists: Vec::new(),
            selected_list: 0,
            list_name_input: None,
            history: Vec::new(),
            history_selected: 0,
            list_chooser: None,
            confirm_clear_items: config.confirm_clear_items,
            offline: false,
            status_message: None,
            pending_confirm: None,
            needs_redraw: true,
            show_help: false,
        })
    }

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Clamp all selection indices to valid ranges.
    ///
    /// Call this after any operation that may shrink a list, such as item
    /// removal, list deletion, or history clearing.
    pub fn clamp_selections(&mut self) {
        self.selected_item = if self.collection.is_empty() {
            0
        } else {
            self.selected_item
                .min(self.collection.len().saturating_sub(1))
        };
        self.selected_list = if self.lists.is_empty() {
            0
        } else {
            self.selected_list.min(self.lists.len().saturating_sub(1))
        };
        self.history_selected = if self.history.is_empty() {
            0
        } else {
            self.history_selected
                .min(self.history.len().saturating_sub(1))
        };
        if let Some(sel) = self.search_selected {
            if self.search_results.is_empty() {
                self.search_selected = None;
            } else {
                self.search_selected =
                    Some(sel.min(self.search_results.len().saturating_sub(1)));
            }
        }
        if let Some(sel) = self.list_chooser {
            if self.lists.is_empty() {
                self.list_chooser = None;
            } else {
                self.list_chooser = Some(sel.min(self.lists.len().saturating_sub(1)));
            }
        }
    }

    /// Get currently selected collection item (bounds-checked)
    pub fn selected_item(&self) -> Option<&Item> {
        self.collection.items().get(self.selected_item)
    }

    /// Get currently selected saved list (bounds-checked)
    pub fn selected_list(&self) -> Option<&SavedList> {
        self.lists.get(self.selected_list)
    }

    /// Reload the saved lists cache from the database.
    pub async fn reload_lists(&mut self) -> Result<()> {
        self.lists = self.db.get_lists().await?;
        self.clamp_selections();
        self.needs_redraw = true;
        Ok(())
    }

    /// Reload the pick history cache from the database.
    pub async fn reload_history(&mut self) -> Result<()> {
        self.history = self.db.get_history().await?;
        self.clamp_selections();
        self.needs_redraw = true;
        Ok(())
    }

    /// Add the typed text as a custom item, or queue a duplicate
    /// confirmation. Clears the input and dropdown on success.
    pub fn submit_custom_item(&mut self) {
        let text = self.search_input.clone();
        match self.collection.add_with_duplicate_check(&text) {
            Ok(AddOutcome::Added) => {
                self.clear_search_box();
                self.set_status("Item added");
            }
            Ok(AddOutcome::NeedsConfirmation { name }) => {
                self.pending_confirm = Some(ConfirmAction::DuplicateAdd {
                    item: Item::custom(&name),
                });
            }
            Err(CollectionError::EmptyName) => {
                self.set_status(CollectionError::EmptyName.to_string());
            }
            Err(e) => {
                self.set_status(e.to_string());
            }
        }
        self.needs_redraw = true;
    }

    /// Add a catalog result to the collection, or queue a duplicate
    /// confirmation that keeps the result's metadata.
    pub fn add_catalog_item(&mut self, item: Item) {
        if self.collection.contains_name(&item.name) {
            self.pending_confirm = Some(ConfirmAction::DuplicateAdd { item });
        } else {
            self.collection.add(item);
            self.clear_search_box();
            self.set_status("Item added");
        }
        self.needs_redraw = true;
    }

    /// Reset the search input, dropdown, and any pending debounce. Aborts
    /// an in-flight search and bumps the generation so a late completion
    /// is rejected.
    pub fn clear_search_box(&mut self) {
        self.search_input.clear();
        self.search_results.clear();
        self.search_selected = None;
        self.search_debounce = None;
        self.pending_search = None;
        self.search_in_flight = false;
        self.search_generation = self.search_generation.wrapping_add(1);
        if let Some(handle) = self.search_handle.take() {
            handle.abort();
        }
        self.needs_redraw = true;
    }

    /// Navigate up in the focused list of the current view
    pub fn nav_up(&mut self) {
        match self.view {
            View::Picker => {
                if let Some(sel) = self.list_chooser {
                    self.list_chooser = Some(sel.saturating_sub(1));
                } else if let Some(sel) = self.search_selected {
                    // Up from the first result returns focus to the input
                    self.search_selected = sel.checked_sub(1);
                } else {
                    self.selected_item = self.selected_item.saturating_sub(1);
                }
            }
            View::Lists => {
                self.selected_list = self.selected_list.saturating_sub(1);
            }
            View::History => {
                self.history_selected = self.history_selected.saturating_sub(1);
            }
        }
        self.needs_redraw = true;
    }

    /// Navigate down in the focused list of the current view
    pub fn nav_down(&mut self) {
        match self.view {
            View::Picker => {
                if let Some(sel) = self.list_chooser {
                    if !self.lists.is_empty() {
                        let max = self.lists.len().saturating_sub(1);
                        self.list_chooser = Some(sel.saturating_add(1).min(max));
                    }
                } else if !self.search_results.is_empty() {
                    let max = self.search_results.len().saturating_sub(1);
                    self.search_selected = Some(match self.search_selected {
                        None => 0,
                        Some(sel) => sel.saturating_add(1).min(max),
                    });
                } else if !self.collection.is_empty() {
                    let max = self.collection.len().saturating_sub(1);
                    self.selected_item = self.selected_item.saturating_add(1).min(max);
                }
            }
            View::Lists => {
                if !self.lists.is_empty() {
                    let max = self.lists.len().saturating_sub(1);
                    self.selected_list = self.selected_list.saturating_add(1).min(max);
                }
            }
            View::History => {
                if !self.history.is_empty() {
                    let max = self.history.len().saturating_sub(1);
                    self.history_selected = self.history_selected.saturating_add(1).min(max);
                }
            }
        }
        self.needs_redraw = true;
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

/// Abort all in-flight async tasks on App drop.
///
/// Ensures proper cleanup when the application exits, preventing orphaned
/// tokio tasks from continuing to run after the main event loop terminates.
impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.search_handle.take() {
            handle.abort();
            tracing::debug!("Aborted search task on App drop");
        }
        if let Some(handle) = self.spin_handle.take() {
            handle.abort();
            tracing::debug!("Aborted spin task on App drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{self, Duration};

    async fn test_app() -> App {
        let db = Database::open(":memory:").await.unwrap();
        App::new(db, &Config::default()).unwrap()
    }

    #[tokio::test]
    async fn test_nav_empty_lists() {
        let app = test_app().await;
        assert!(app.selected_item().is_none());
        assert!(app.selected_list().is_none());
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        // Create app before pausing time to avoid DB connection timeout
        let mut app = test_app().await;
        time::pause();
        app.set_status("Test message");

        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        app.clear_expired_status();
        assert!(app.status_message.is_some()); // Still present at 2s

        time::advance(Duration::from_secs(2)).await;
        app.clear_expired_status();
        assert!(app.status_message.is_none()); // Expired after 3s
    }

    #[tokio::test]
    async fn test_clamp_selections_empty_lists() {
        let mut app = test_app().await;
        app.selected_item = 10;
        app.selected_list = 20;
        app.history_selected = 30;

        app.clamp_selections();

        assert_eq!(app.selected_item, 0);
        assert_eq!(app.selected_list, 0);
        assert_eq!(app.history_selected, 0);
    }

    #[tokio::test]
    async fn test_clamp_selections_out_of_bounds_item() {
        let mut app = test_app().await;
        app.collection.add(Item::custom("a"));
        app.selected_item = 5;

        app.clamp_selections();

        assert_eq!(app.selected_item, 0);
    }

    #[tokio::test]
    async fn test_submit_empty_input_sets_status() {
        let mut app = test_app().await;
        app.search_input = "   ".to_string();

        app.submit_custom_item();

        assert!(app.collection.is_empty());
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg.as_ref(), "Please enter an item name.");
    }

    #[tokio::test]
    async fn test_submit_adds_and_clears_input() {
        let mut app = test_app().await;
        app.search_input = "Pizza Night".to_string();

        app.submit_custom_item();

        assert_eq!(app.collection.len(), 1);
        assert!(app.search_input.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_submit_queues_confirmation() {
        let mut app = test_app().await;
        app.search_input = "Pizza".to_string();
        app.submit_custom_item();
        app.search_input = "pizza".to_string();
        app.submit_custom_item();

        assert_eq!(app.collection.len(), 1);
        assert!(matches!(
            app.pending_confirm,
            Some(ConfirmAction::DuplicateAdd { .. })
        ));
    }

    #[tokio::test]
    async fn test_catalog_duplicate_keeps_metadata_in_confirmation() {
        let mut app = test_app().await;
        app.collection.add(Item::custom("Dune"));

        let mut dune = Item::custom("Dune");
        dune.image = Some("https://image.tmdb.org/t/p/w500/dune.jpg".to_string());
        app.add_catalog_item(dune);

        assert_eq!(app.collection.len(), 1);
        match &app.pending_confirm {
            Some(ConfirmAction::DuplicateAdd { item }) => {
                assert!(item.image.is_some());
            }
            _ => panic!("expected duplicate confirmation"),
        }
    }

    #[tokio::test]
    async fn test_clear_search_box_bumps_generation() {
        let mut app = test_app().await;
        let before = app.search_generation;
        app.search_input = "zel".to_string();
        app.pending_search = Some("zel".to_string());

        app.clear_search_box();

        assert!(app.search_generation > before);
        assert!(app.pending_search.is_none());
        assert!(app.search_results.is_empty());
    }

    #[tokio::test]
    async fn test_nav_down_prefers_dropdown_over_collection() {
        let mut app = test_app().await;
        app.collection.add(Item::custom("a"));
        app.collection.add(Item::custom("b"));
        app.search_results = vec![Item::custom("result")];

        app.nav_down();

        assert_eq!(app.search_selected, Some(0));
        assert_eq!(app.selected_item, 0);
    }

    #[tokio::test]
    async fn test_nav_up_from_first_result_returns_to_input() {
        let mut app = test_app().await;
        app.search_results = vec![Item::custom("result")];
        app.search_selected = Some(0);

        app.nav_up();

        assert_eq!(app.search_selected, None);
    }
}
