//! Entity store implementation module

pub mod backend;
pub mod context;
pub mod store;

pub use backend::{DocumentMutation, StorageBackend};
pub use context::{StoreContext, StoreProvider};
pub use store::StoreImpl;
