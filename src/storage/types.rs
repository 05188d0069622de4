use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::normalize_name;

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another instance of the application has locked the database
    #[error("Another instance of spinpick appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let error_string = err.to_string().to_lowercase();

        // SQLITE_BUSY (5), SQLITE_LOCKED (6), SQLITE_CANTOPEN (14)
        if error_string.contains("database is locked")
            || error_string.contains("database table is locked")
            || error_string.contains("sqlite_busy")
            || error_string.contains("sqlite_locked")
            || error_string.contains("unable to open database file")
        {
            return DatabaseError::InstanceLocked;
        }

        DatabaseError::Other(err)
    }
}

/// Errors from list-store mutations.
///
/// `EmptyName` is user input recovered locally by re-prompting; it is never
/// surfaced as a crash.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("List name cannot be empty")]
    EmptyName,
}

// ============================================================================
// Item Model
// ============================================================================

/// The catalog an item came from, or a free-form tag for custom entries.
///
/// Serialized as the plain strings `"game"`, `"movie"`, `"tv"`, or the
/// custom string, matching the original storage format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemKind {
    Game,
    Movie,
    Tv,
    Other(String),
}

impl From<String> for ItemKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "game" => ItemKind::Game,
            "movie" => ItemKind::Movie,
            "tv" => ItemKind::Tv,
            _ => ItemKind::Other(s),
        }
    }
}

impl From<ItemKind> for String {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Game => "game".to_string(),
            ItemKind::Movie => "movie".to_string(),
            ItemKind::Tv => "tv".to_string(),
            ItemKind::Other(s) => s,
        }
    }
}

impl ItemKind {
    /// Short label for display ("GAME", "MOVIE", "TV", or the custom tag).
    pub fn label(&self) -> String {
        match self {
            ItemKind::Game => "GAME".to_string(),
            ItemKind::Movie => "MOVIE".to_string(),
            ItemKind::Tv => "TV".to_string(),
            ItemKind::Other(s) => s.to_uppercase(),
        }
    }
}

/// A candidate or chosen entity: a search result, collection member,
/// list member, or history record.
///
/// Field names serialize camelCase with `type` for the kind tag, keeping
/// the stored JSON compatible with the original format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Display name; required, non-empty after trimming.
    pub name: String,
    /// Catalog image URL, when the provider supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Provider-native date string; stored as-is, never re-validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Catalog tag; absent for plain custom entries.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    /// External catalog identifier; absent for user-typed items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Item {
    /// A bare custom entry with only a name.
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: None,
            release_date: None,
            kind: None,
            id: None,
        }
    }

    /// Duplicate rule: equal normalized names. `id`/`kind`/`image` are
    /// irrelevant to duplicate detection.
    pub fn same_name(&self, other_name: &str) -> bool {
        normalize_name(&self.name) == normalize_name(other_name)
    }
}

// ============================================================================
// Persisted Containers
// ============================================================================

/// A named, persisted collection of items, independent of the active
/// picking session. Items in a list are independent copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedList {
    /// Opaque unique id (uuid v4).
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// One completed pick, recorded at the moment the spin settled.
///
/// `picked_at` is optional with a serde default so entries written in the
/// bare-item format still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub item: Item,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picked_at: Option<DateTime<Utc>>,
}
