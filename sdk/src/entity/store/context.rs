//! Per-operation store scopes

use super::store::StoreImpl;
use super::StorageBackend;
use anyhow::Result;
use std::sync::Arc;

/// Store handle scoped to one logical operation (a query build, a worker
/// iteration). Scopes are never shared between concurrent operations.
pub struct StoreContext<B: StorageBackend> {
    /// The entity store instance
    store: StoreImpl<B>,
    scope_id: u64,
}

impl<B: StorageBackend> StoreContext<B> {
    /// Create a new store context
    pub fn new(store: StoreImpl<B>, scope_id: u64) -> Self {
        Self { store, scope_id }
    }

    /// Get access to the entity store
    pub fn store(&self) -> &StoreImpl<B> {
        &self.store
    }

    pub fn scope_id(&self) -> u64 {
        self.scope_id
    }
}

/// Hands out a fresh [`StoreContext`] per logical operation
pub trait StoreProvider: Send + Sync + 'static {
    type Backend: StorageBackend + 'static;

    fn create_scope(&self) -> Result<StoreContext<Self::Backend>>;
}

impl<P: StoreProvider> StoreProvider for Arc<P> {
    type Backend = P::Backend;

    fn create_scope(&self) -> Result<StoreContext<Self::Backend>> {
        (**self).create_scope()
    }
}
