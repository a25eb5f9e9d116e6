//! Catalog CLI library
//!
//! Runs catalog operations against a JSON product file loaded into the
//! in-memory store. Useful for inspecting how a lazy-loading descriptor
//! filters and pages a data set, and for trying the quantity pipeline.

pub mod catalog_file;
pub mod commands;

pub use catalog_file::CatalogFile;
pub use commands::{Command, list::ListCommand, query::QueryCommand, update_qty::UpdateQtyCommand};
