//! The active picking session's item collection.
//!
//! An ordered sequence of items; insertion order drives both display order
//! and the index space the picker spins over. Duplicates are allowed, but
//! only after the user explicitly confirms one.

use std::sync::Arc;

use thiserror::Error;

use crate::storage::Item;
use crate::util::normalize_name;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectionError {
    /// Empty user input; recovered locally by re-prompting.
    #[error("Please enter an item name.")]
    EmptyName,

    /// A caller passed an index not present in the current collection.
    /// Should never occur given correct caller discipline.
    #[error("Index {index} out of bounds (len {len})")]
    OutOfBounds { index: usize, len: usize },
}

/// Outcome of an add attempt that went through duplicate checking.
#[derive(Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// The item was appended.
    Added,
    /// An item with the same normalized name already exists; the caller
    /// must ask the user before appending a second copy.
    NeedsConfirmation { name: String },
}

/// Ordered collection of candidate items for the current session.
///
/// Not persisted across runs; created empty and destroyed on clear or exit.
#[derive(Debug, Default)]
pub struct ItemCollection {
    items: Vec<Item>,
}

impl ItemCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Immutable snapshot of the current items, shared with a spin episode
    /// so mid-spin mutation cannot shift the index space under it.
    pub fn snapshot(&self) -> Arc<[Item]> {
        Arc::from(self.items.as_slice())
    }

    /// Append unconditionally. Used for catalog results the user selected
    /// from the dropdown and for confirmed duplicates.
    pub fn add(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Case-insensitive presence check on trimmed names. Catalog results
    /// carry metadata, so duplicate detection for them happens here and the
    /// caller keeps the full item for a confirmed add.
    pub fn contains_name(&self, name: &str) -> bool {
        let normalized = normalize_name(name);
        self.items
            .iter()
            .any(|i| normalize_name(&i.name) == normalized)
    }

    /// Add a custom entry by name with duplicate detection.
    ///
    /// Trims the input, rejects empty names, and reports when the caller
    /// must confirm a duplicate. Declining a confirmation means simply not
    /// calling [`ItemCollection::add`]; the collection is untouched.
    pub fn add_with_duplicate_check(&mut self, name: &str) -> Result<AddOutcome, CollectionError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CollectionError::EmptyName);
        }

        let normalized = normalize_name(trimmed);
        if self
            .items
            .iter()
            .any(|i| normalize_name(&i.name) == normalized)
        {
            return Ok(AddOutcome::NeedsConfirmation {
                name: trimmed.to_string(),
            });
        }

        self.items.push(Item::custom(trimmed));
        Ok(AddOutcome::Added)
    }

    /// Remove the item at `index`.
    ///
    /// The UI only ever supplies indices from the current render state, so
    /// `OutOfBounds` indicates a programming defect upstream.
    pub fn remove(&mut self, index: usize) -> Result<Item, CollectionError> {
        if index >= self.items.len() {
            return Err(CollectionError::OutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Empty the collection. Callers confirm with the user first and must
    /// also reset any in-flight picker episode.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_appends_in_order() {
        let mut c = ItemCollection::new();
        c.add(Item::custom("a"));
        c.add(Item::custom("b"));
        assert_eq!(c.items()[0].name, "a");
        assert_eq!(c.items()[1].name, "b");
    }

    #[test]
    fn duplicate_check_rejects_empty_after_trim() {
        let mut c = ItemCollection::new();
        assert_eq!(
            c.add_with_duplicate_check("   "),
            Err(CollectionError::EmptyName)
        );
        assert!(c.is_empty());
    }

    #[test]
    fn duplicate_check_trims_before_adding() {
        let mut c = ItemCollection::new();
        assert_eq!(c.add_with_duplicate_check("  Foo  "), Ok(AddOutcome::Added));
        assert_eq!(c.items()[0].name, "Foo");
    }

    #[test]
    fn duplicate_detected_case_insensitively() {
        let mut c = ItemCollection::new();
        c.add_with_duplicate_check("Foo").unwrap();
        assert_eq!(
            c.add_with_duplicate_check("foo").unwrap(),
            AddOutcome::NeedsConfirmation {
                name: "foo".to_string()
            }
        );
        // Declined confirmation: caller does nothing, exactly one item remains
        assert_eq!(c.len(), 1);
        assert_eq!(c.items()[0].name, "Foo");
    }

    #[test]
    fn confirmed_duplicate_appends_second_copy() {
        let mut c = ItemCollection::new();
        c.add_with_duplicate_check("Foo").unwrap();
        match c.add_with_duplicate_check("FOO").unwrap() {
            AddOutcome::NeedsConfirmation { name } => c.add(Item::custom(name)),
            AddOutcome::Added => panic!("expected duplicate detection"),
        }
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn contains_name_ignores_case_and_whitespace() {
        let mut c = ItemCollection::new();
        c.add(Item::custom("Breath of the Wild"));
        assert!(c.contains_name("  breath of the wild "));
        assert!(!c.contains_name("Tears of the Kingdom"));
    }

    #[test]
    fn remove_returns_item_and_shifts_order() {
        let mut c = ItemCollection::new();
        c.add(Item::custom("a"));
        c.add(Item::custom("b"));
        c.add(Item::custom("c"));
        let removed = c.remove(1).unwrap();
        assert_eq!(removed.name, "b");
        assert_eq!(c.items()[1].name, "c");
    }

    #[test]
    fn remove_out_of_bounds_errors() {
        let mut c = ItemCollection::new();
        c.add(Item::custom("a"));
        assert_eq!(
            c.remove(5),
            Err(CollectionError::OutOfBounds { index: 5, len: 1 })
        );
    }

    #[test]
    fn snapshot_is_isolated_from_mutation() {
        let mut c = ItemCollection::new();
        c.add(Item::custom("a"));
        c.add(Item::custom("b"));
        let snap = c.snapshot();
        c.clear();
        assert_eq!(snap.len(), 2);
        assert!(c.is_empty());
    }
}
