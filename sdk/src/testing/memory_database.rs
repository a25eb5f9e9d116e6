// In-memory database implementation
use crate::entity::store::{
    DocumentMutation, StorageBackend, StoreContext, StoreImpl, StoreProvider,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::debug;

#[derive(Debug, Default)]
pub struct MemoryDatabase {
    // table_name -> entity_id -> document
    data: DashMap<String, DashMap<String, Value>>,
    // remaining updates that should fail, for exercising error paths
    failing_updates: AtomicUsize,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.data.clear();
    }

    pub fn get_table_count(&self, table: &str) -> usize {
        self.data
            .get(table)
            .map(|table_data| table_data.len())
            .unwrap_or(0)
    }

    /// Check if entity exists (for testing purposes)
    pub fn entity_exists(&self, table: &str, id: &str) -> bool {
        self.data
            .get(table)
            .map(|table_data| table_data.contains_key(id))
            .unwrap_or(false)
    }

    /// Make the next `count` update calls fail with a storage error
    pub fn fail_next_updates(&self, count: usize) {
        self.failing_updates.store(count, Ordering::SeqCst);
    }

    fn take_injected_failure(&self) -> bool {
        self.failing_updates
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl StorageBackend for MemoryDatabase {
    async fn get(&self, table: &str, id: &str) -> Result<Option<Value>> {
        Ok(self
            .data
            .get(table)
            .and_then(|table_data| table_data.get(id).map(|entry| entry.value().clone())))
    }

    async fn list(&self, table: &str) -> Result<Vec<Value>> {
        let Some(table_data) = self.data.get(table) else {
            return Ok(vec![]);
        };

        let mut entries: Vec<(String, Value)> = table_data
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        // Sort by entity ID for consistent ordering
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(entries.into_iter().map(|(_, value)| value).collect())
    }

    async fn upsert(&self, table: &str, entries: Vec<(String, Value)>) -> Result<()> {
        let table_map = self.data.entry(table.to_string()).or_default();
        for (id, value) in entries {
            table_map.insert(id, value);
        }
        Ok(())
    }

    async fn delete(&self, table: &str, ids: Vec<String>) -> Result<()> {
        if let Some(table_data) = self.data.get(table) {
            for id in ids {
                table_data.remove(&id);
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        mutation: DocumentMutation,
    ) -> Result<Option<Value>> {
        if self.take_injected_failure() {
            return Err(anyhow!("injected storage failure updating {}/{}", table, id));
        }

        let Some(table_data) = self.data.get(table) else {
            return Ok(None);
        };
        let Some(mut entry) = table_data.get_mut(id) else {
            return Ok(None);
        };

        // mutate a copy so a failing mutation never leaves a partial write
        let mut doc = entry.value().clone();
        mutation(&mut doc)?;
        *entry.value_mut() = doc.clone();
        Ok(Some(doc))
    }
}

/// [`StoreProvider`] over a shared [`MemoryDatabase`].
///
/// Every scope gets its own store handle and a sequential scope id, which
/// lets tests assert how many scopes an operation opened.
#[derive(Debug, Clone)]
pub struct MemoryStoreProvider {
    db: Arc<MemoryDatabase>,
    scopes: Arc<AtomicU64>,
}

impl MemoryStoreProvider {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self {
            db,
            scopes: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn database(&self) -> &Arc<MemoryDatabase> {
        &self.db
    }

    /// Number of scopes handed out so far
    pub fn scopes_created(&self) -> u64 {
        self.scopes.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStoreProvider {
    fn default() -> Self {
        Self::new(Arc::new(MemoryDatabase::new()))
    }
}

impl StoreProvider for MemoryStoreProvider {
    type Backend = MemoryDatabase;

    fn create_scope(&self) -> Result<StoreContext<MemoryDatabase>> {
        let scope_id = self.scopes.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Opening store scope {}", scope_id);
        Ok(StoreContext::new(StoreImpl::from_arc(self.db.clone()), scope_id))
    }
}

/// Test store type alias for use in testing contexts
pub type TestStore = StoreImpl<MemoryDatabase>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let db = MemoryDatabase::new();
        db.upsert(
            "item",
            vec![
                ("b".to_string(), json!({"id": "b"})),
                ("a".to_string(), json!({"id": "a"})),
            ],
        )
        .await
        .unwrap();

        let listed = db.list("item").await.unwrap();
        assert_eq!(listed, vec![json!({"id": "a"}), json!({"id": "b"})]);
        assert!(db.list("missing").await.unwrap().is_empty());
        assert!(db.entity_exists("item", "a"));

        db.clear();
        assert!(!db.entity_exists("item", "a"));
        assert_eq!(db.get_table_count("item"), 0);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_document_untouched() {
        let db = MemoryDatabase::new();
        db.upsert("item", vec![("a".to_string(), json!({"qty": 1}))])
            .await
            .unwrap();

        let result = db
            .update(
                "item",
                "a",
                Box::new(|doc: &mut Value| {
                    doc["qty"] = json!(99);
                    Err(anyhow!("boom"))
                }),
            )
            .await;
        assert!(result.is_err());
        assert_eq!(db.get("item", "a").await.unwrap(), Some(json!({"qty": 1})));
    }

    #[tokio::test]
    async fn update_of_unknown_key_returns_none() {
        let db = MemoryDatabase::new();
        let result = db
            .update("item", "ghost", Box::new(|_doc: &mut Value| Ok(())))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let db = MemoryDatabase::new();
        db.upsert("item", vec![("a".to_string(), json!({}))])
            .await
            .unwrap();
        db.fail_next_updates(1);

        let noop = || -> DocumentMutation { Box::new(|_doc: &mut Value| Ok(())) };
        assert!(db.update("item", "a", noop()).await.is_err());
        assert!(db.update("item", "a", noop()).await.unwrap().is_some());
    }

    #[test]
    fn provider_counts_scopes() {
        let provider = MemoryStoreProvider::default();
        let first = provider.create_scope().unwrap();
        let second = provider.create_scope().unwrap();
        assert_eq!(first.scope_id(), 1);
        assert_eq!(second.scope_id(), 2);
        assert_eq!(provider.scopes_created(), 2);
    }
}
