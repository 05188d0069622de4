use std::collections::HashMap;

use crate::storage::Item;
use crate::util::normalize_name;

/// Session-scoped memo of catalog results, keyed by the normalized query
/// (trim + lowercase).
///
/// Explicitly constructed and owned by the app (not a process global), so
/// its lifetime is exactly one session. Unbounded and never invalidated:
/// acceptable only because it dies with the session, and stale results for
/// a re-typed query are indistinguishable from fresh ones to the user.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<String, Vec<Item>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached results for a query, if any. A hit means the catalog adapter
    /// must not be invoked.
    pub fn lookup(&self, query: &str) -> Option<&[Item]> {
        self.entries
            .get(&normalize_name(query))
            .map(Vec::as_slice)
    }

    /// Store results under the normalized query.
    pub fn store(&mut self, query: &str, results: Vec<Item>) {
        self.entries.insert(normalize_name(query), results);
    }
}
