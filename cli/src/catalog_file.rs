use anyhow::{Context, Result};
use catalog_sdk::testing::MemoryStoreProvider;
use catalog_sdk::{EntityStore, Product, StoreProvider};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A JSON array of products on disk, mirrored into an in-memory store
pub struct CatalogFile {
    path: PathBuf,
    provider: MemoryStoreProvider,
}

impl CatalogFile {
    /// Read `path` and load every product into a fresh in-memory store
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            anyhow::bail!("Catalog data file not found: {}", path.display());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read catalog data: {}", path.display()))?;
        let products: Vec<Product> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog data: {}", path.display()))?;

        let provider = MemoryStoreProvider::default();
        provider.create_scope()?.store().upsert_many(&products).await?;
        info!("Loaded {} products from {}", products.len(), path.display());

        Ok(Self { path, provider })
    }

    pub fn provider(&self) -> &MemoryStoreProvider {
        &self.provider
    }

    /// Write the current store contents back to the data file
    pub async fn save(&self) -> Result<()> {
        let products: Vec<Product> = self.provider.create_scope()?.store().list().await?;
        let content = serde_json::to_string_pretty(&products)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write catalog data: {}", self.path.display()))?;
        debug!("Saved {} products to {}", products.len(), self.path.display());
        Ok(())
    }
}
