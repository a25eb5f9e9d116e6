//! Core store implementation for entities

use crate::entity::store::StorageBackend;
use crate::entity::traits::{Entity, EntityId, EntityStore};
use crate::entity::types::EntityError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Store implementation that uses a storage backend
pub struct StoreImpl<B: StorageBackend> {
    /// Storage backend
    backend: Arc<B>,
}

impl<B: StorageBackend> Clone for StoreImpl<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
        }
    }
}

impl<B: StorageBackend> StoreImpl<B> {
    /// Create a new store instance with a shared backend
    pub fn from_arc(backend: Arc<B>) -> Self {
        Self { backend }
    }

    fn decode_all<T: Entity>(values: Vec<serde_json::Value>) -> Result<Vec<T>> {
        values
            .into_iter()
            .map(|value| {
                T::from_json(value)
                    .with_context(|| format!("Failed to decode '{}' entity", T::table_name()))
            })
            .collect()
    }
}

#[async_trait]
impl<B: StorageBackend> EntityStore for StoreImpl<B> {
    async fn get<T: Entity>(&self, id: &T::Id) -> Result<Option<T>> {
        match self.backend.get(T::table_name(), &id.as_string()).await? {
            Some(value) => Ok(Some(T::from_json(value)?)),
            None => Ok(None),
        }
    }

    async fn upsert<T: Entity>(&self, entity: &T) -> Result<()> {
        let entry = (entity.id().as_string(), entity.to_json()?);
        self.backend.upsert(T::table_name(), vec![entry]).await
    }

    async fn upsert_many<T: Entity>(&self, entities: &[T]) -> Result<()> {
        let entries = entities
            .iter()
            .map(|entity| Ok((entity.id().as_string(), entity.to_json()?)))
            .collect::<Result<Vec<_>>>()?;
        self.backend.upsert(T::table_name(), entries).await
    }

    async fn delete<T: Entity>(&self, id: &T::Id) -> Result<()> {
        self.backend
            .delete(T::table_name(), vec![id.as_string()])
            .await
    }

    async fn list<T: Entity>(&self) -> Result<Vec<T>> {
        let values = self.backend.list(T::table_name()).await?;
        Self::decode_all(values)
    }

    async fn update<T, F>(&self, id: &T::Id, mutate: F) -> Result<T>
    where
        T: Entity,
        F: FnOnce(&mut T) + Send + 'static,
    {
        let id_string = id.as_string();
        let mutation = Box::new(move |doc: &mut serde_json::Value| -> Result<()> {
            let mut entity = T::from_json(doc.clone())?;
            mutate(&mut entity);
            *doc = entity.to_json()?;
            Ok(())
        });

        match self
            .backend
            .update(T::table_name(), &id_string, mutation)
            .await?
        {
            Some(value) => T::from_json(value),
            None => Err(EntityError::not_found(T::table_name(), id_string).into()),
        }
    }
}
