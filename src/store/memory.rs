//! In-memory record store.
//!
//! Used by tests, by the `lookup` command for dry runs, and anywhere a
//! real table is not available.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashSet;

use crate::store::types::StoreResult;
use crate::store::RecordStore;

type RowKey = (String, String, String);

/// A thread-safe set of `(table, key_name, key)` rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Arc<DashSet<RowKey>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row. Inserting an existing row is a no-op.
    pub fn insert(&self, table: &str, key_name: &str, key: &str) {
        self.rows
            .insert((table.to_string(), key_name.to_string(), key.to_string()));
    }

    /// Remove a row, returning whether it was present.
    pub fn remove(&self, table: &str, key_name: &str, key: &str) -> bool {
        self.rows
            .remove(&(table.to_string(), key_name.to_string(), key.to_string()))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn contains(&self, table: &str, key_name: &str, key: &str) -> StoreResult<bool> {
        Ok(self
            .rows
            .contains(&(table.to_string(), key_name.to_string(), key.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_contains_is_exact_on_all_three_parts() {
        let store = MemoryStore::new();
        store.insert("tenants", "domain", "shop");

        assert!(store.contains("tenants", "domain", "shop").await.unwrap());
        assert!(!store.contains("tenants", "domain", "Shop").await.unwrap());
        assert!(!store.contains("tenants", "id", "shop").await.unwrap());
        assert!(!store.contains("other", "domain", "shop").await.unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_rows() {
        let store = MemoryStore::new();
        let handle = store.clone();
        handle.insert("t", "k", "v");
        assert_eq!(store.len(), 1);

        assert!(store.remove("t", "k", "v"));
        assert!(handle.is_empty());
        assert!(!handle.contains("t", "k", "v").await.unwrap());
    }
}
