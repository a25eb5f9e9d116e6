//! Entity framework
//!
//! Records with an introspectable field registry, a typed store facade over
//! JSON document backends, and composable in-memory queries used by the
//! lazy-loading engine.

pub mod query;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use query::{EntityQuery, Predicate, Queryable, SortDirection, SortKey};
pub use store::{StorageBackend, StoreContext, StoreImpl, StoreProvider};
pub use traits::{Entity, EntityId, EntityStore, FieldKind, FieldRegistry};
pub use types::{
    BigDecimal, EntityError, EntityResult, FieldDef, FieldType, FieldValue, ScalarType, Timestamp,
};
