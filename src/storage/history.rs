use anyhow::Result;
use chrono::Utc;

use super::schema::Database;
use super::types::{HistoryEntry, Item};

/// Storage key for the pick history journal.
const HISTORY_KEY: &str = "history";

impl Database {
    // ========================================================================
    // History Log Operations
    // ========================================================================

    /// Record a completed pick. The entry is prepended (newest first) and
    /// persisted before this returns.
    pub async fn record_pick(&self, item: &Item) -> Result<()> {
        let mut entries: Vec<HistoryEntry> = self.get_json(HISTORY_KEY).await?;
        entries.insert(
            0,
            HistoryEntry {
                item: item.clone(),
                picked_at: Some(Utc::now()),
            },
        );
        self.set_json(HISTORY_KEY, &entries).await
    }

    /// Full history, newest first. Missing or malformed stored data reads
    /// as empty.
    pub async fn get_history(&self) -> Result<Vec<HistoryEntry>> {
        self.get_json(HISTORY_KEY).await
    }

    /// Empty the history journal.
    pub async fn clear_history(&self) -> Result<()> {
        self.remove_value(HISTORY_KEY).await
    }
}
