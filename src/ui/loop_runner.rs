//! Main event loop for the TUI.
//!
//! This module contains the core event loop that multiplexes terminal input,
//! background task events, and periodic ticks.

use crate::app::{App, AppEvent};
use anyhow::Result;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::{FutureExt, StreamExt};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_app_event;
use super::input::handle_input;
use super::render::render;

/// Maximum allowed search query length (UI layer validation)
const MAX_SEARCH_LENGTH: usize = 256;

/// Result of handling a key press event.
///
/// Returned by input handlers to signal whether the application should
/// continue running or terminate gracefully.
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Runs the TUI application event loop.
///
/// Uses `tokio::select!` to multiplex three event sources:
/// - **Terminal input**: Key presses from crossterm's async event stream
/// - **Background tasks**: Catalog searches and spin animation via `AppEvent` channel
/// - **Periodic tick**: 250ms timer for status expiry and debounced search
///
/// # Panic Safety
///
/// Installs a panic hook that restores terminal state before unwinding,
/// ensuring the terminal is not left in raw mode on panic.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    // Install panic hook BEFORE setting up terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();

    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    // Signal handlers for graceful shutdown (Unix only)
    // On non-Unix platforms, these become pending futures that never complete
    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        // Only render when state has changed
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        // Clear expired status messages and trigger redraw if cleared
        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Drain all pending app events before handling more input so spin
        // frames and search results are processed promptly even during
        // rapid typing.
        while let Ok(event) = event_rx.try_recv() {
            app.needs_redraw = true;
            handle_app_event(app, event).await;
        }

        // Platform-specific signal futures
        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;  // Process in order listed for predictable behavior

            // Signal handlers for graceful shutdown (highest priority)
            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            // Terminal input events
            maybe_event = event_stream.next() => {
                if let Some(Ok(Event::Key(key))) = maybe_event {
                    app.needs_redraw = true;
                    match handle_input(app, key.code, key.modifiers, &event_tx).await {
                        Ok(Action::Quit) => break,
                        Ok(Action::Continue) => {}
                        Err(e) => app.set_status(format!("Error: {}", e)),
                    }
                }
            }

            // Background task events (blocking recv for when queue was empty)
            Some(event) = event_rx.recv() => {
                app.needs_redraw = true;
                handle_app_event(app, event).await;
            }

            // Periodic tick for status expiry and debounced search
            _ = tick_interval.tick() => {
                handle_tick(app, &event_tx);
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Handle periodic tick for debounced catalog search execution.
///
/// The search fires once the input has been idle for the configured
/// debounce window. Cached queries short-circuit without spawning a task.
fn handle_tick(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(last_keystroke) = app.search_debounce else {
        return;
    };
    if last_keystroke.elapsed() < Duration::from_millis(app.search_debounce_ms) {
        return;
    }
    app.search_debounce = None;

    let Some(query) = app.pending_search.take() else {
        return;
    };
    app.needs_redraw = true;

    if query.trim().is_empty() {
        app.search_results.clear();
        app.search_selected = None;
        return;
    }
    if app.offline {
        return;
    }
    if query.len() > MAX_SEARCH_LENGTH {
        app.set_status(format!(
            "Search query too long (max {} chars)",
            MAX_SEARCH_LENGTH
        ));
        return;
    }

    // Repeated query in this session: serve from the cache, no network
    if let Some(cached) = app.query_cache.lookup(&query) {
        tracing::debug!(query = %query, "Search served from query cache");
        app.search_results = cached.to_vec();
        app.search_selected = None;
        app.search_in_flight = false;
        return;
    }

    spawn_search(app, query, event_tx);
}

/// Spawn a background catalog search task.
///
/// The task sends results via `AppEvent::SearchCompleted` with a generation
/// counter so stale results from rapid typing are rejected.
fn spawn_search(app: &mut App, query: String, event_tx: &mpsc::Sender<AppEvent>) {
    // Abort any previous search task
    if let Some(handle) = app.search_handle.take() {
        handle.abort();
        tracing::debug!("Aborted previous search task");
    }

    // Increment generation counter for this new search
    app.search_generation = app.search_generation.wrapping_add(1);
    let generation = app.search_generation;

    app.search_in_flight = true;

    let catalog = app.catalog.clone();
    let tx = event_tx.clone();
    let query_for_task = query.clone();

    tracing::debug!(query = %query, generation, "Spawning catalog search task");

    app.search_handle = Some(tokio::spawn(async move {
        match catch_task_panic(catalog.search(&query_for_task)).await {
            Ok(results) => {
                let event = AppEvent::SearchCompleted {
                    query: query_for_task,
                    generation,
                    results,
                };
                if let Err(e) = tx.send(event).await {
                    tracing::warn!(error = %e, "Failed to send search results (receiver dropped)");
                }
            }
            Err(panic_msg) => {
                tracing::error!(error = %panic_msg, "Search task panicked");
                let _ = tx
                    .send(AppEvent::TaskPanicked {
                        task: "search",
                        error: panic_msg,
                    })
                    .await;
            }
        }
    }));
}

/// Wrap a future so a panic inside it becomes an `Err(message)` instead of
/// silently killing the task.
async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            }
        })
}

/// Spawn the spin animation task for a freshly started pick episode.
///
/// Emits one `SpinFrame` per animation step, then `SpinCompleted`. The
/// receiving side validates the generation, so a reset mid-spin simply
/// makes every remaining event a no-op.
pub(super) fn spawn_spin(
    app: &mut App,
    plan: crate::picker::SpinPlan,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    if let Some(handle) = app.spin_handle.take() {
        handle.abort();
        tracing::debug!("Aborted previous spin task");
    }

    let tx = event_tx.clone();
    let generation = plan.generation;

    tracing::debug!(generation, frames = plan.frames.len(), "Spawning spin task");

    app.spin_handle = Some(tokio::spawn(async move {
        for frame in plan.frames {
            tokio::time::sleep(plan.frame_delay).await;
            if tx
                .send(AppEvent::SpinFrame { generation, frame })
                .await
                .is_err()
            {
                return;
            }
        }
        if let Err(e) = tx.send(AppEvent::SpinCompleted { generation }).await {
            tracing::warn!(error = %e, "Failed to send spin completion (receiver dropped)");
        }
    }));
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::config::Config;
    use crate::storage::{Database, Item};
    use tokio::time::{self, Instant};

    async fn test_app() -> (App, mpsc::Sender<AppEvent>, mpsc::Receiver<AppEvent>) {
        let db = Database::open(":memory:").await.unwrap();
        let app = App::new(db, &Config::default()).unwrap();
        let (tx, rx) = mpsc::channel(32);
        (app, tx, rx)
    }

    fn arm_elapsed_debounce(app: &mut App, query: &str) {
        app.search_input = query.to_string();
        app.pending_search = Some(query.to_string());
        app.search_debounce = Some(Instant::now());
    }

    #[tokio::test]
    async fn tick_before_debounce_window_does_nothing() {
        let (mut app, tx, _rx) = test_app().await;
        time::pause();
        arm_elapsed_debounce(&mut app, "zelda");

        time::advance(Duration::from_millis(100)).await;
        handle_tick(&mut app, &tx);

        assert_eq!(app.pending_search.as_deref(), Some("zelda"));
        assert!(app.search_handle.is_none());
    }

    #[tokio::test]
    async fn tick_after_debounce_window_spawns_search() {
        let (mut app, tx, _rx) = test_app().await;
        time::pause();
        arm_elapsed_debounce(&mut app, "zelda");

        time::advance(Duration::from_millis(500)).await;
        handle_tick(&mut app, &tx);

        assert!(app.pending_search.is_none());
        assert!(app.search_in_flight);
        assert!(app.search_handle.is_some());
    }

    #[tokio::test]
    async fn offline_mode_never_spawns_a_search() {
        let (mut app, tx, _rx) = test_app().await;
        app.offline = true;
        time::pause();
        arm_elapsed_debounce(&mut app, "zelda");

        time::advance(Duration::from_millis(500)).await;
        handle_tick(&mut app, &tx);

        assert!(app.pending_search.is_none());
        assert!(!app.search_in_flight);
        assert!(app.search_handle.is_none());
        assert!(app.search_results.is_empty());
    }

    #[tokio::test]
    async fn cached_query_is_served_without_a_task() {
        let (mut app, tx, _rx) = test_app().await;
        app.query_cache
            .store("zelda", vec![Item::custom("Breath of the Wild")]);
        time::pause();
        arm_elapsed_debounce(&mut app, "zelda");

        time::advance(Duration::from_millis(500)).await;
        handle_tick(&mut app, &tx);

        assert_eq!(app.search_results.len(), 1);
        assert!(app.search_handle.is_none());
    }
}
