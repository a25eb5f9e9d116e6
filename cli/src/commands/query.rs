use anyhow::{Context, Result};
use async_trait::async_trait;
use catalog_sdk::{CatalogConfig, CatalogRuntime, QueryDescriptor};
use std::path::PathBuf;

use super::{Command, print_json};
use crate::catalog_file::CatalogFile;

/// Run one lazy-loading request. Without a descriptor the configured
/// defaults are used.
pub struct QueryCommand {
    pub data: PathBuf,
    pub descriptor: Option<String>,
    pub config: CatalogConfig,
}

impl QueryCommand {
    /// Inline JSON, or `@path` to read it from a file
    pub fn parse_descriptor(&self) -> Result<Option<QueryDescriptor>> {
        let Some(raw) = &self.descriptor else {
            return Ok(None);
        };
        let text = match raw.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read descriptor file: {}", path))?,
            None => raw.clone(),
        };
        let descriptor = serde_json::from_str(&text).context("Invalid lazy loading descriptor")?;
        Ok(Some(descriptor))
    }
}

#[async_trait]
impl Command for QueryCommand {
    async fn execute(&self) -> Result<()> {
        let descriptor = self.parse_descriptor()?;
        let file = CatalogFile::open(&self.data).await?;
        let runtime = CatalogRuntime::new(file.provider().clone(), self.config.clone());
        print_json(&runtime.service().get_products_lazy_list(descriptor).await)
    }
}
