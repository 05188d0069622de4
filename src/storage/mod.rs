mod history;
mod kv;
mod lists;
mod schema;
mod types;

pub use schema::Database;
pub use types::{DatabaseError, HistoryEntry, Item, ItemKind, SavedList, StoreError};
