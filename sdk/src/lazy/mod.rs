//! Lazy-loading query engine
//!
//! A client sends a [`QueryDescriptor`] (paging window, ordering, per-column
//! and global filters). The [`QueryDescriptorValidator`] and
//! [`DefaultDescriptorProvider`] make sure one is present and well formed,
//! then [`LazyQueryEngine`] checks every referenced column against the
//! record's [`FieldRegistry`](crate::entity::FieldRegistry) and composes the
//! filters, ordering and window over any [`Queryable`](crate::entity::Queryable).
//!
//! Inherited policy: a filter whose value cannot be used for its column and
//! mode is skipped (logged at debug level), while unknown columns always
//! abort the query with a [`QueryError`].

pub mod convert;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod predicate;
pub mod validator;

pub use convert::{convert_to_type, try_parse_numeric};
pub use descriptor::{FilterScope, FilterSpec, MatchMode, QueryDescriptor, SortMeta};
pub use engine::LazyQueryEngine;
pub use error::{ConversionError, QueryError};
pub use predicate::{FilterPredicateBuilder, GlobalTerm};
pub use validator::{
    DefaultDescriptorProvider, INVALID_DESCRIPTOR_MESSAGE, QueryDescriptorValidator,
};
