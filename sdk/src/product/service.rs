//! Product catalog operations exposed to the outer (HTTP) layer.
//!
//! Every operation opens its own store scope and never returns an error:
//! failures are logged and turned into a failure result with a user-facing
//! message.

use crate::config::CatalogConfig;
use crate::entity::{EntityError, StoreProvider};
use crate::lazy::{
    DefaultDescriptorProvider, INVALID_DESCRIPTOR_MESSAGE, LazyQueryEngine, QueryDescriptor,
    QueryDescriptorValidator, QueryError,
};
use crate::product::dto::{ProductCreate, ProductDetail, ProductListItem, ProductUpdateQty};
use crate::product::repository::ProductRepository;
use crate::queue::QueueChannel;
use crate::result::{DataResult, QueryResult, ResultInfo};
use anyhow::Result;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const INVALID_IMAGE_URL_MESSAGE: &str = "The provided ImageUrl is not a valid URL.";
pub const PRODUCT_NOT_FOUND_MESSAGE: &str = "Product not found.";
pub const PRODUCT_WAS_NOT_FOUND_MESSAGE: &str = "Product wasn't found.";
pub const NEGATIVE_QUANTITY_MESSAGE: &str = "Quantity cannot be negative.";
pub const ENQUEUED_MESSAGE: &str = "Message enqueued successfully.";

// absolute http(s) URL with a non-empty authority
static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[^\s/?#]+(?:[/?#]\S*)?$").expect("image URL pattern is valid")
});

pub fn is_valid_image_url(url: &str) -> bool {
    IMAGE_URL.is_match(url.trim())
}

/// Product use cases over a store provider and the quantity-update queue
pub struct ProductCatalogService<P, Q> {
    provider: P,
    queue: Arc<Q>,
    engine: LazyQueryEngine,
    validator: QueryDescriptorValidator,
    defaults: DefaultDescriptorProvider,
}

impl<P, Q> ProductCatalogService<P, Q>
where
    P: StoreProvider,
    Q: QueueChannel<ProductUpdateQty>,
{
    pub fn new(provider: P, queue: Arc<Q>, config: &CatalogConfig) -> Self {
        Self {
            provider,
            queue,
            engine: LazyQueryEngine::new(),
            validator: QueryDescriptorValidator::from_config(config),
            defaults: DefaultDescriptorProvider::from_config(config),
        }
    }

    pub fn queue(&self) -> &Arc<Q> {
        &self.queue
    }

    fn repository(&self) -> Result<ProductRepository<P::Backend>> {
        let scope = self.provider.create_scope()?;
        Ok(ProductRepository::new(&scope))
    }

    pub async fn create_product(&self, create: ProductCreate) -> DataResult<ProductDetail> {
        info!("Attempting to create a new product");

        if !is_valid_image_url(&create.image_url) {
            warn!("Invalid URL provided for product image: {}", create.image_url);
            return DataResult::fail(INVALID_IMAGE_URL_MESSAGE);
        }

        let created = async { self.repository()?.insert(create).await }.await;
        match created {
            Ok(product) => {
                info!("Successfully created product with ID: {}", product.guid);
                DataResult::ok(product)
            }
            Err(err) => {
                error!("An error occurred while creating a new product: {:#}", err);
                DataResult::fail("An unexpected error occurred while creating the product.")
            }
        }
    }

    pub async fn get_product_detail(&self, guid: Uuid) -> DataResult<ProductDetail> {
        info!("Attempting to retrieve details for product with ID: {}", guid);

        let found = async { self.repository()?.get(&guid).await }.await;
        match found {
            Ok(Some(product)) => {
                info!("Successfully retrieved details for product with ID: {}", guid);
                DataResult::ok(product)
            }
            Ok(None) => {
                warn!("Product with ID {} not found", guid);
                DataResult::fail(PRODUCT_NOT_FOUND_MESSAGE)
            }
            Err(err) => {
                error!(
                    "An error occurred while retrieving details for product with ID {}: {:#}",
                    guid, err
                );
                DataResult::fail(
                    "An unexpected error occurred while retrieving the product details.",
                )
            }
        }
    }

    /// All products ordered by name
    pub async fn list_products(&self) -> DataResult<Vec<ProductListItem>> {
        info!("Attempting to retrieve the list of products");

        let listed = async { self.repository()?.list_all().await }.await;
        match listed {
            Ok(products) => {
                info!("Successfully retrieved {} products", products.len());
                DataResult::ok(products)
            }
            Err(err) => {
                error!("An error occurred while retrieving the product list: {:#}", err);
                DataResult::fail("An unexpected error occurred while retrieving the product list.")
            }
        }
    }

    /// One page of the product listing.
    ///
    /// No descriptor means the configured defaults; a descriptor without
    /// `first`/`rows` is rejected. Unknown columns are reported back with the
    /// offending names.
    pub async fn get_products_lazy_list(
        &self,
        descriptor: Option<QueryDescriptor>,
    ) -> QueryResult<ProductListItem> {
        let descriptor = match descriptor {
            None => self.defaults.default_descriptor(),
            Some(mut descriptor) => {
                if !self.validator.is_valid(Some(&mut descriptor)) {
                    warn!("Rejected lazy loading descriptor without mandatory paging");
                    return QueryResult::fail(INVALID_DESCRIPTOR_MESSAGE);
                }
                descriptor
            }
        };

        let page = async {
            self.repository()?
                .lazy_list(&self.engine, &descriptor)
                .await
        }
        .await;

        match page {
            Ok(page) => page,
            Err(err) => match err.downcast_ref::<QueryError>() {
                Some(query_error) => {
                    warn!("Invalid lazy loading descriptor: {}", query_error);
                    QueryResult::fail(query_error.to_string())
                }
                None => {
                    error!(
                        "An error occurred while retrieving the lazy list of products: {:#}",
                        err
                    );
                    QueryResult::fail(
                        "An error occurred while retrieving the lazy list of products.",
                    )
                }
            },
        }
    }

    /// Set the quantity right away, bypassing the queue
    pub async fn update_product_qty(&self, update: ProductUpdateQty) -> DataResult<ProductDetail> {
        info!("Attempting to update quantity for product with ID: {}", update.guid);

        let updated = async { self.repository()?.update_product_qty(&update).await }.await;
        match updated {
            Ok(product) => {
                info!("Successfully updated quantity for product with ID: {}", product.guid);
                DataResult::ok(product)
            }
            Err(err) if is_not_found(&err) => {
                error!("Product not found. ID: {}", update.guid);
                DataResult::fail(PRODUCT_WAS_NOT_FOUND_MESSAGE)
            }
            Err(err) => {
                error!(
                    "An error occurred while updating quantity for product with ID {}: {:#}",
                    update.guid, err
                );
                DataResult::fail(
                    "An unexpected error occurred while updating the product quantity.",
                )
            }
        }
    }

    /// Check the request and hand it to the background worker
    pub async fn validate_and_enqueue(&self, update: ProductUpdateQty) -> ResultInfo {
        if update.quantity < 0 {
            warn!(
                "Validation failed: Quantity cannot be negative. Product ID: {}",
                update.guid
            );
            return ResultInfo::fail(NEGATIVE_QUANTITY_MESSAGE);
        }

        let enqueued = async {
            if self.repository()?.get(&update.guid).await?.is_none() {
                return Ok(false);
            }
            self.queue.write(update).await?;
            Ok::<_, anyhow::Error>(true)
        }
        .await;

        match enqueued {
            Ok(true) => {
                info!("Product update enqueued successfully. Product ID: {}", update.guid);
                ResultInfo::ok(ENQUEUED_MESSAGE)
            }
            Ok(false) => {
                warn!("Validation failed: Product not found. Product ID: {}", update.guid);
                ResultInfo::fail(PRODUCT_NOT_FOUND_MESSAGE)
            }
            Err(err) => {
                error!(
                    "An error occurred while enqueuing product update. Product ID {}: {:#}",
                    update.guid, err
                );
                ResultInfo::fail("An unexpected error occurred while enqueuing the product update.")
            }
        }
    }
}

pub(crate) fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<EntityError>()
        .is_some_and(EntityError::is_not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lazy::{FilterSpec, MatchMode};
    use crate::queue::UnboundedQueueChannel;
    use crate::testing::{MemoryStoreProvider, mock_product, seed_products};

    type TestService =
        ProductCatalogService<MemoryStoreProvider, UnboundedQueueChannel<ProductUpdateQty>>;

    fn service(provider: &MemoryStoreProvider) -> TestService {
        ProductCatalogService::new(
            provider.clone(),
            Arc::new(UnboundedQueueChannel::new()),
            &CatalogConfig::default(),
        )
    }

    #[test]
    fn image_urls_must_be_absolute_http() {
        assert!(is_valid_image_url("https://cdn.example.com/a.png"));
        assert!(is_valid_image_url("HTTP://example.com"));
        assert!(is_valid_image_url("http://localhost:8080/img?id=3"));
        assert!(!is_valid_image_url("ftp://example.com/a.png"));
        assert!(!is_valid_image_url("/images/a.png"));
        assert!(!is_valid_image_url("https://"));
        assert!(!is_valid_image_url("not a url"));
    }

    #[tokio::test]
    async fn create_rejects_bad_url() {
        let provider = MemoryStoreProvider::default();
        let result = service(&provider)
            .create_product(ProductCreate::new("Bolt", "bolt.png"))
            .await;
        assert!(!result.success);
        assert_eq!(result.messages, vec![INVALID_IMAGE_URL_MESSAGE]);
        assert_eq!(provider.database().get_table_count("product"), 0);
    }

    #[tokio::test]
    async fn create_then_fetch_detail() {
        let provider = MemoryStoreProvider::default();
        let service = service(&provider);

        let created = service
            .create_product(ProductCreate::new("Bolt", "https://cdn.example.com/bolt.png"))
            .await;
        assert!(created.success);
        let product = created.data.unwrap();
        assert_eq!(product.quantity, 0);

        let detail = service.get_product_detail(product.guid).await;
        assert_eq!(detail.data, Some(product));
    }

    #[tokio::test]
    async fn missing_detail_is_reported() {
        let provider = MemoryStoreProvider::default();
        let detail = service(&provider).get_product_detail(Uuid::new_v4()).await;
        assert!(!detail.success);
        assert_eq!(detail.messages, vec![PRODUCT_NOT_FOUND_MESSAGE]);
    }

    #[tokio::test]
    async fn lazy_list_without_descriptor_uses_defaults() {
        let provider = MemoryStoreProvider::default();
        seed_products(&provider, 12).await;

        let result = service(&provider).get_products_lazy_list(None).await;
        assert!(result.success);
        assert_eq!(result.total, 12);
        assert_eq!(result.data.len(), 10);
        assert!(result.data.windows(2).all(|w| w[0].guid < w[1].guid));
    }

    #[tokio::test]
    async fn lazy_list_rejects_descriptor_without_paging() {
        let provider = MemoryStoreProvider::default();
        let descriptor = QueryDescriptor {
            first: Some(0),
            ..QueryDescriptor::default()
        };

        let result = service(&provider).get_products_lazy_list(Some(descriptor)).await;
        assert!(!result.success);
        assert_eq!(result.total, 0);
        assert_eq!(result.messages, vec![INVALID_DESCRIPTOR_MESSAGE]);
    }

    #[tokio::test]
    async fn lazy_list_reports_invalid_columns() {
        let provider = MemoryStoreProvider::default();
        let descriptor = QueryDescriptor::page(0, 5)
            .with_filter("colour", FilterSpec::local("red", MatchMode::Equals))
            .with_filter("size", FilterSpec::local("M", MatchMode::Equals));

        let result = service(&provider).get_products_lazy_list(Some(descriptor)).await;
        assert!(!result.success);
        assert_eq!(
            result.messages,
            vec!["Filters contain invalid columns: colour, size"]
        );
    }

    #[tokio::test]
    async fn synchronous_update_reports_missing_product() {
        let provider = MemoryStoreProvider::default();
        let result = service(&provider)
            .update_product_qty(ProductUpdateQty::new(Uuid::new_v4(), 3))
            .await;
        assert!(!result.success);
        assert_eq!(result.messages, vec![PRODUCT_WAS_NOT_FOUND_MESSAGE]);
    }

    #[tokio::test]
    async fn negative_quantity_never_reaches_the_queue() {
        let provider = MemoryStoreProvider::default();
        let service = service(&provider);
        let product = mock_product("Bolt", 1);
        seed(&provider, &product).await;

        let result = service
            .validate_and_enqueue(ProductUpdateQty::new(product.guid, -1))
            .await;
        assert!(!result.success);
        assert_eq!(result.messages, vec![NEGATIVE_QUANTITY_MESSAGE]);
        assert!(service.queue().is_empty());
    }

    #[tokio::test]
    async fn unknown_product_is_not_enqueued() {
        let provider = MemoryStoreProvider::default();
        let service = service(&provider);

        let result = service
            .validate_and_enqueue(ProductUpdateQty::new(Uuid::new_v4(), 1))
            .await;
        assert_eq!(result.messages, vec![PRODUCT_NOT_FOUND_MESSAGE]);
        assert!(service.queue().is_empty());
    }

    #[tokio::test]
    async fn valid_update_is_enqueued_once() {
        let provider = MemoryStoreProvider::default();
        let service = service(&provider);
        let product = mock_product("Bolt", 1);
        seed(&provider, &product).await;

        let result = service
            .validate_and_enqueue(ProductUpdateQty::new(product.guid, 9))
            .await;
        assert!(result.success);
        assert_eq!(result.messages, vec![ENQUEUED_MESSAGE]);
        assert_eq!(service.queue().len(), 1);
    }

    async fn seed(provider: &MemoryStoreProvider, product: &crate::product::Product) {
        use crate::entity::EntityStore;
        let scope = provider.create_scope().unwrap();
        scope.store().upsert(product).await.unwrap();
    }
}
