use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up when a directory is given to [`CatalogConfig::load_from_path`]
pub const CONFIG_FILE_NAME: &str = "catalog.yaml";

/// Main configuration structure for the catalog
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    pub lazy_loading: DefaultLazyLoadingOptions,
    /// Treat filter keys containing `global` as global-search columns
    /// (`"name_global"` → global filter on `name`). Off unless a client still
    /// sends the old key convention.
    pub legacy_global_filter_keys: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            lazy_loading: DefaultLazyLoadingOptions::default(),
            legacy_global_filter_keys: false,
        }
    }
}

/// Paging and sorting used when a client sends no descriptor at all
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DefaultLazyLoadingOptions {
    pub first: i32,
    pub rows: i32,
    pub sort_field: String,
    pub sort_order: i32,
}

impl Default for DefaultLazyLoadingOptions {
    fn default() -> Self {
        Self {
            first: 0,
            rows: 10,
            sort_field: "guid".to_string(),
            sort_order: 1,
        }
    }
}

impl CatalogConfig {
    /// Load configuration from a YAML file, or from `catalog.yaml` inside a
    /// directory
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = resolve(path.as_ref());

        if !config_path.exists() {
            return Err(anyhow!(
                "Configuration file not found at: {}",
                config_path.display()
            ));
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: CatalogConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file (or `catalog.yaml` inside a directory)
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_path = resolve(path.as_ref());

        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let options = &self.lazy_loading;

        if options.first < 0 {
            return Err(anyhow!("Default 'first' cannot be negative"));
        }

        if options.rows <= 0 {
            return Err(anyhow!("Default 'rows' must be positive"));
        }

        if options.sort_field.is_empty() {
            return Err(anyhow!("Default sort field cannot be empty"));
        }

        Ok(())
    }
}

fn resolve(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}
