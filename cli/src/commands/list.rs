use anyhow::Result;
use async_trait::async_trait;
use catalog_sdk::{CatalogConfig, CatalogRuntime};
use std::path::PathBuf;

use super::{Command, print_json};
use crate::catalog_file::CatalogFile;

pub struct ListCommand {
    pub data: PathBuf,
    pub config: CatalogConfig,
}

#[async_trait]
impl Command for ListCommand {
    async fn execute(&self) -> Result<()> {
        let file = CatalogFile::open(&self.data).await?;
        let runtime = CatalogRuntime::new(file.provider().clone(), self.config.clone());
        print_json(&runtime.service().list_products().await)
    }
}
