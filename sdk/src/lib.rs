pub mod config;
pub mod entity;
pub mod lazy;
pub mod product;
pub mod queue;
pub mod result;
pub mod runtime;
pub mod testing;

// Re-export commonly used types for convenience
pub use config::{CatalogConfig, DefaultLazyLoadingOptions};
pub use runtime::{CatalogRuntime, RuntimeArgs, UpdateQueue, init_logging};

// Re-export async_trait macro for convenience
pub use async_trait::async_trait;

// Re-export entity framework components
pub use entity::{
    BigDecimal, Entity, EntityError, EntityId, EntityQuery, EntityResult, EntityStore,
    FieldRegistry, Queryable, StoreProvider, Timestamp,
};

// Re-export lazy-loading components
pub use lazy::{
    DefaultDescriptorProvider, FilterPredicateBuilder, FilterSpec, LazyQueryEngine, MatchMode,
    QueryDescriptor, QueryDescriptorValidator, QueryError,
};

pub use product::{
    Product, ProductCatalogService, ProductCreate, ProductDetail, ProductListItem,
    ProductUpdateQty, QuantityUpdateWorker,
};
pub use queue::{QueueChannel, QueueError, UnboundedQueueChannel};
pub use result::{DataResult, QueryResult, ResultInfo};
