//! Product catalog: entity, views, persistence, use cases and the
//! background quantity-update worker

pub mod dto;
pub mod model;
pub mod repository;
pub mod service;
pub mod worker;

pub use dto::{ProductCreate, ProductDetail, ProductListItem, ProductUpdateQty};
pub use model::{Product, ProductBuilder};
pub use repository::ProductRepository;
pub use service::{
    ENQUEUED_MESSAGE, INVALID_IMAGE_URL_MESSAGE, NEGATIVE_QUANTITY_MESSAGE,
    PRODUCT_NOT_FOUND_MESSAGE, PRODUCT_WAS_NOT_FOUND_MESSAGE, ProductCatalogService,
    is_valid_image_url,
};
pub use worker::{QuantityUpdateWorker, WorkerState, WorkerStats};
