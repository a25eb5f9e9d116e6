//! Storage backend abstraction for entity stores

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Mutation applied to a stored document in place
pub type DocumentMutation = Box<dyn FnOnce(&mut Value) -> Result<()> + Send>;

/// Trait for storage backends.
///
/// Documents are JSON values keyed by table and id; the typed layer lives in
/// [`StoreImpl`](super::StoreImpl).
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Get a document by table and key
    async fn get(&self, table: &str, id: &str) -> Result<Option<Value>>;

    /// All documents of a table in the backend's natural order
    async fn list(&self, table: &str) -> Result<Vec<Value>>;

    /// Insert or replace documents
    async fn upsert(&self, table: &str, entries: Vec<(String, Value)>) -> Result<()>;

    /// Delete documents by key
    async fn delete(&self, table: &str, ids: Vec<String>) -> Result<()>;

    /// Run `mutation` against the stored document and persist the result as a
    /// single step. Returns the persisted document, or `None` when the key is
    /// unknown. A failing mutation leaves the stored document untouched.
    async fn update(&self, table: &str, id: &str, mutation: DocumentMutation)
        -> Result<Option<Value>>;
}
