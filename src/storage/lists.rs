use anyhow::Result;
use uuid::Uuid;

use super::schema::Database;
use super::types::{Item, SavedList, StoreError};

/// Storage key for the named lists.
const LISTS_KEY: &str = "lists";

impl Database {
    // ========================================================================
    // List Store Operations
    // ========================================================================

    /// Create a new empty list and persist it immediately.
    ///
    /// Returns the fresh list id. Fails with `StoreError::EmptyName` if the
    /// name is empty after trimming.
    pub async fn create_list(&self, name: &str) -> Result<Result<String, StoreError>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Err(StoreError::EmptyName));
        }

        let mut lists: Vec<SavedList> = self.get_json(LISTS_KEY).await?;
        let id = Uuid::new_v4().to_string();
        lists.push(SavedList {
            id: id.clone(),
            name: name.to_string(),
            items: Vec::new(),
        });
        self.set_json(LISTS_KEY, &lists).await?;

        tracing::debug!(list_id = %id, name = %name, "Created list");
        Ok(Ok(id))
    }

    /// Delete a list by id. No-op if absent. The caller is responsible for
    /// confirming the deletion with the user first.
    pub async fn delete_list(&self, id: &str) -> Result<()> {
        let mut lists: Vec<SavedList> = self.get_json(LISTS_KEY).await?;
        let before = lists.len();
        lists.retain(|l| l.id != id);
        if lists.len() != before {
            self.set_json(LISTS_KEY, &lists).await?;
            tracing::debug!(list_id = %id, "Deleted list");
        }
        Ok(())
    }

    /// Append an item to a list.
    ///
    /// Silently a no-op when the list already contains an item with the same
    /// normalized name, or when the list id is unknown. Returns `true` when
    /// the item was actually appended.
    pub async fn add_item_to_list(&self, list_id: &str, item: &Item) -> Result<bool> {
        let mut lists: Vec<SavedList> = self.get_json(LISTS_KEY).await?;

        let Some(list) = lists.iter_mut().find(|l| l.id == list_id) else {
            tracing::debug!(list_id = %list_id, "add_item_to_list: unknown list");
            return Ok(false);
        };

        if list.items.iter().any(|i| i.same_name(&item.name)) {
            return Ok(false);
        }

        list.items.push(item.clone());
        self.set_json(LISTS_KEY, &lists).await?;
        Ok(true)
    }

    /// All saved lists, in creation order. Missing or malformed stored data
    /// reads as empty.
    pub async fn get_lists(&self) -> Result<Vec<SavedList>> {
        self.get_json(LISTS_KEY).await
    }

    /// A single list by id.
    pub async fn get_list(&self, id: &str) -> Result<Option<SavedList>> {
        let lists: Vec<SavedList> = self.get_json(LISTS_KEY).await?;
        Ok(lists.into_iter().find(|l| l.id == id))
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{Database, Item, StoreError};

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn create_list_assigns_unique_ids() {
        let db = test_db().await;
        let a = db.create_list("Favorites").await.unwrap().unwrap();
        let b = db.create_list("Backlog").await.unwrap().unwrap();
        assert_ne!(a, b);

        let lists = db.get_lists().await.unwrap();
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].name, "Favorites");
        assert!(lists[0].items.is_empty());
    }

    #[tokio::test]
    async fn create_list_rejects_empty_name() {
        let db = test_db().await;
        assert_eq!(
            db.create_list("   ").await.unwrap(),
            Err(StoreError::EmptyName)
        );
        assert!(db.get_lists().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_list_trims_name() {
        let db = test_db().await;
        db.create_list("  Movie Night  ").await.unwrap().unwrap();
        let lists = db.get_lists().await.unwrap();
        assert_eq!(lists[0].name, "Movie Night");
    }

    #[tokio::test]
    async fn delete_list_removes_and_tolerates_absent() {
        let db = test_db().await;
        let id = db.create_list("Temp").await.unwrap().unwrap();
        db.delete_list(&id).await.unwrap();
        assert!(db.get_lists().await.unwrap().is_empty());
        // Deleting again is a no-op
        db.delete_list(&id).await.unwrap();
    }

    #[tokio::test]
    async fn add_item_blocks_normalized_duplicates() {
        let db = test_db().await;
        let id = db.create_list("Favorites").await.unwrap().unwrap();

        assert!(db.add_item_to_list(&id, &Item::custom("X")).await.unwrap());
        assert!(!db.add_item_to_list(&id, &Item::custom("X")).await.unwrap());
        assert!(!db.add_item_to_list(&id, &Item::custom(" x ")).await.unwrap());

        let list = db.get_list(&id).await.unwrap().unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].name, "X");
    }

    #[tokio::test]
    async fn add_item_unknown_list_is_noop() {
        let db = test_db().await;
        assert!(!db
            .add_item_to_list("no-such-id", &Item::custom("X"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn same_item_may_live_in_many_lists() {
        let db = test_db().await;
        let a = db.create_list("A").await.unwrap().unwrap();
        let b = db.create_list("B").await.unwrap().unwrap();

        assert!(db.add_item_to_list(&a, &Item::custom("X")).await.unwrap());
        assert!(db.add_item_to_list(&b, &Item::custom("X")).await.unwrap());
    }

    #[tokio::test]
    async fn write_visible_to_immediate_read() {
        let db = test_db().await;
        let id = db.create_list("Now").await.unwrap().unwrap();
        assert!(db.get_list(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn malformed_lists_read_as_empty() {
        let db = test_db().await;
        db.set_value("lists", "[{broken").await.unwrap();
        assert!(db.get_lists().await.unwrap().is_empty());
    }
}
