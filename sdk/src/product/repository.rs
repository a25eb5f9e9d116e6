//! Product persistence on top of a scoped entity store

use crate::entity::{
    EntityQuery, EntityStore, Queryable, SortDirection, SortKey, StorageBackend, StoreContext,
    StoreImpl,
};
use crate::lazy::{LazyQueryEngine, QueryDescriptor};
use crate::product::dto::{ProductCreate, ProductDetail, ProductListItem, ProductUpdateQty};
use crate::product::model::Product;
use crate::result::QueryResult;
use anyhow::Result;
use tracing::debug;
use uuid::Uuid;

/// Product queries and updates for one store scope
pub struct ProductRepository<B: StorageBackend> {
    store: StoreImpl<B>,
}

impl<B: StorageBackend> ProductRepository<B> {
    pub fn new(scope: &StoreContext<B>) -> Self {
        Self {
            store: scope.store().clone(),
        }
    }

    pub async fn get(&self, guid: &Uuid) -> Result<Option<ProductDetail>> {
        Ok(self.store.get::<Product>(guid).await?.map(ProductDetail::from))
    }

    pub async fn insert(&self, create: ProductCreate) -> Result<ProductDetail> {
        let product = create.into_product();
        self.store.upsert(&product).await?;
        debug!("Inserted product {}", product.guid);
        Ok(product.into())
    }

    pub async fn insert_products(&self, products: Vec<ProductDetail>) -> Result<()> {
        let products: Vec<Product> = products.into_iter().map(Product::from).collect();
        self.store.upsert_many(&products).await
    }

    /// Every product, ordered by name
    pub async fn list_all(&self) -> Result<Vec<ProductListItem>> {
        let query = self.list_query().await?.order_by(vec![SortKey {
            field: "name",
            direction: SortDirection::Ascending,
        }]);
        Ok(query.page(0, usize::MAX))
    }

    /// Set the stock of one product.
    ///
    /// Fails with [`EntityError::NotFound`](crate::entity::EntityError) when
    /// the product does not exist.
    pub async fn update_product_qty(&self, update: &ProductUpdateQty) -> Result<ProductDetail> {
        let quantity = update.quantity;
        let product = self
            .store
            .update::<Product, _>(&update.guid, move |product| product.quantity = quantity)
            .await?;
        Ok(product.into())
    }

    /// Overwrite every field of the product `guid` with `changes`. The id in
    /// `changes` is ignored.
    ///
    /// Fails with [`EntityError::NotFound`](crate::entity::EntityError) when
    /// the product does not exist.
    pub async fn update(&self, guid: &Uuid, changes: ProductDetail) -> Result<ProductDetail> {
        let product = self
            .store
            .update::<Product, _>(guid, move |product| {
                let guid = product.guid;
                *product = Product::from(changes);
                product.guid = guid;
            })
            .await?;
        debug!("Updated product {}", product.guid);
        Ok(product.into())
    }

    /// Remove a product. Deleting an unknown id is a no-op.
    pub async fn delete(&self, guid: &Uuid) -> Result<()> {
        self.store.delete::<Product>(guid).await?;
        debug!("Deleted product {}", guid);
        Ok(())
    }

    /// One page of the product listing driven by a client descriptor.
    ///
    /// Descriptor problems surface as [`QueryError`](crate::lazy::QueryError)
    /// inside the returned error.
    pub async fn lazy_list(
        &self,
        engine: &LazyQueryEngine,
        descriptor: &QueryDescriptor,
    ) -> Result<QueryResult<ProductListItem>> {
        let query = self.list_query().await?;
        Ok(engine.execute(descriptor, query)?)
    }

    async fn list_query(&self) -> Result<EntityQuery<ProductListItem>> {
        let rows = self.store.list::<Product>().await?;
        Ok(EntityQuery::new(
            rows.into_iter().map(ProductListItem::from).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityError, StoreProvider};
    use crate::lazy::{FilterSpec, MatchMode, QueryError};
    use crate::testing::{MemoryDatabase, MemoryStoreProvider, mock_product};

    fn repository(provider: &MemoryStoreProvider) -> ProductRepository<MemoryDatabase> {
        ProductRepository::new(&provider.create_scope().unwrap())
    }

    #[tokio::test]
    async fn insert_then_get() {
        let provider = MemoryStoreProvider::default();
        let repo = repository(&provider);
        assert!(repo.list_all().await.unwrap().is_empty());

        let created = repo
            .insert(ProductCreate::new("Spring", "https://cdn.example.com/spring.png"))
            .await
            .unwrap();

        let loaded = repo.get(&created.guid).await.unwrap();
        assert_eq!(loaded, Some(created));
    }

    #[tokio::test]
    async fn list_all_is_ordered_by_name() {
        let provider = MemoryStoreProvider::default();
        let repo = repository(&provider);
        repo.insert_products(vec![
            mock_product("Gasket", 1).into(),
            mock_product("Axle", 2).into(),
            mock_product("Cog", 3).into(),
        ])
        .await
        .unwrap();

        let names: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Axle", "Cog", "Gasket"]);
    }

    #[tokio::test]
    async fn update_missing_product_is_not_found() {
        let provider = MemoryStoreProvider::default();
        let repo = repository(&provider);

        let err = repo
            .update_product_qty(&ProductUpdateQty::new(Uuid::new_v4(), 5))
            .await
            .unwrap_err();
        assert!(err
            .downcast_ref::<EntityError>()
            .is_some_and(EntityError::is_not_found));
    }

    #[tokio::test]
    async fn update_sets_quantity() {
        let provider = MemoryStoreProvider::default();
        let repo = repository(&provider);
        let product = mock_product("Hinge", 1);
        repo.insert_products(vec![product.clone().into()]).await.unwrap();

        let updated = repo
            .update_product_qty(&ProductUpdateQty::new(product.guid, 42))
            .await
            .unwrap();
        assert_eq!(updated.quantity, 42);
        assert_eq!(repo.get(&product.guid).await.unwrap().unwrap().quantity, 42);
    }

    #[tokio::test]
    async fn update_overwrites_fields_but_keeps_id() {
        let provider = MemoryStoreProvider::default();
        let repo = repository(&provider);
        let product = mock_product("Hinge", 1);
        repo.insert_products(vec![product.clone().into()]).await.unwrap();

        let mut changes: ProductDetail = mock_product("Brass hinge", 9).into();
        changes.description = Some("Polished".to_string());
        let updated = repo.update(&product.guid, changes).await.unwrap();

        assert_eq!(updated.guid, product.guid);
        assert_eq!(updated.name, "Brass hinge");
        assert_eq!(updated.quantity, 9);
        assert_eq!(repo.get(&product.guid).await.unwrap(), Some(updated));
        assert_eq!(provider.database().get_table_count("product"), 1);
    }

    #[tokio::test]
    async fn update_of_missing_product_is_not_found() {
        let provider = MemoryStoreProvider::default();
        let repo = repository(&provider);

        let err = repo
            .update(&Uuid::new_v4(), mock_product("Ghost", 1).into())
            .await
            .unwrap_err();
        assert!(err
            .downcast_ref::<EntityError>()
            .is_some_and(EntityError::is_not_found));
    }

    #[tokio::test]
    async fn delete_removes_only_that_product() {
        let provider = MemoryStoreProvider::default();
        let repo = repository(&provider);
        let keep = mock_product("Axle", 1);
        let removed = mock_product("Cog", 2);
        repo.insert_products(vec![keep.clone().into(), removed.clone().into()])
            .await
            .unwrap();

        repo.delete(&removed.guid).await.unwrap();
        repo.delete(&Uuid::new_v4()).await.unwrap();

        assert!(repo.get(&removed.guid).await.unwrap().is_none());
        assert!(repo.get(&keep.guid).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn lazy_list_reports_query_errors() {
        let provider = MemoryStoreProvider::default();
        let repo = repository(&provider);
        let descriptor = QueryDescriptor::page(0, 10)
            .with_filter("colour", FilterSpec::local("red", MatchMode::Equals));

        let err = repo
            .lazy_list(&LazyQueryEngine::new(), &descriptor)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<QueryError>(),
            Some(QueryError::InvalidFilterColumn { .. })
        ));
    }
}
