//! Testing support for catalog code
//!
//! - [`MemoryDatabase`]: in-memory [`StorageBackend`](crate::entity::StorageBackend)
//!   with failure injection, so tests run without external storage
//! - [`MemoryStoreProvider`]: hands out store scopes over a shared
//!   `MemoryDatabase` and counts them
//! - fixtures such as [`mock_product`] and [`seed_products`]
//!
//! # Usage
//!
//! ```rust
//! use catalog_sdk::testing::{MemoryStoreProvider, seed_products};
//!
//! #[tokio::test]
//! async fn test_listing() {
//!     let provider = MemoryStoreProvider::default();
//!     let products = seed_products(&provider, 3).await;
//!     assert_eq!(products.len(), 3);
//! }
//! ```

pub mod memory_database;
pub mod utils;

pub use memory_database::*;
pub use utils::*;
