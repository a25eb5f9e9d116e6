use anyhow::Result;
use async_trait::async_trait;
use catalog_sdk::{CatalogConfig, CatalogRuntime, ProductUpdateQty};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use super::{Command, print_json};
use crate::catalog_file::CatalogFile;

/// Send a quantity update through the queue, wait for the worker to apply it
/// and print the product afterwards
pub struct UpdateQtyCommand {
    pub data: PathBuf,
    pub id: Uuid,
    pub quantity: i32,
    pub save: bool,
    pub config: CatalogConfig,
}

#[async_trait]
impl Command for UpdateQtyCommand {
    async fn execute(&self) -> Result<()> {
        let file = CatalogFile::open(&self.data).await?;

        let mut runtime = CatalogRuntime::new(file.provider().clone(), self.config.clone());
        runtime.start();
        let outcome = runtime
            .service()
            .validate_and_enqueue(ProductUpdateQty::new(self.id, self.quantity))
            .await;
        runtime.shutdown().await?;

        if !outcome.success {
            print_json(&outcome)?;
            anyhow::bail!("Quantity update was rejected");
        }

        let runtime = CatalogRuntime::new(file.provider().clone(), self.config.clone());
        print_json(&runtime.service().get_product_detail(self.id).await)?;

        if self.save {
            file.save().await?;
            info!("Saved updated catalog to {}", self.data.display());
        }
        Ok(())
    }
}
