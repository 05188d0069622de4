//! Application event handling.
//!
//! This module processes background task completion events: catalog search
//! results, spin animation frames, and the spin completion that triggers
//! the record-then-reveal sequence.

use crate::app::{App, AppEvent};

/// Handle application events from background tasks.
pub(super) async fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::SearchCompleted {
            query,
            generation,
            results,
        } => {
            handle_search_completed(app, query, generation, results);
        }
        AppEvent::SpinFrame { generation, frame } => {
            app.picker.spin_frame(generation, frame);
        }
        AppEvent::SpinCompleted { generation } => {
            handle_spin_completed(app, generation).await;
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}

/// Apply catalog search results, rejecting stale generations.
///
/// Every completed search lands in the query cache, empty result sets
/// included, so retyping the same query never refetches.
fn handle_search_completed(
    app: &mut App,
    query: String,
    generation: u64,
    results: Vec<crate::storage::Item>,
) {
    if generation != app.search_generation {
        tracing::debug!(
            query = %query,
            expected = app.search_generation,
            received = generation,
            "Ignoring stale search results"
        );
        return;
    }

    app.query_cache.store(&query, results.clone());
    app.search_in_flight = false;

    // Only show the dropdown if the user is still looking at this query
    if app.search_input.trim() == query.trim() {
        app.search_results = results;
        app.search_selected = None;
    }
}

/// Choose the winner, record it, then reveal.
///
/// The history write happens before the reveal so the journal never misses
/// a pick the user saw. A failed write still reveals; losing one history
/// row beats swallowing the result of the spin.
async fn handle_spin_completed(app: &mut App, generation: u64) {
    let Some(item) = app.picker.complete(generation) else {
        return;
    };

    if let Err(e) = app.db.record_pick(&item).await {
        tracing::warn!(error = %e, item = %item.name, "Failed to record pick in history");
        app.set_status("Pick not saved to history");
    } else if let Err(e) = app.reload_history().await {
        tracing::warn!(error = %e, "Failed to reload history after pick");
    }

    app.picker.settle(generation);
}
