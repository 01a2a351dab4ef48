//! Asset registry read from a local JSON file

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;
use txlens_common::{Registry, lookup::AssetRegistryLookup};

pub struct FileRegistry {
    path: PathBuf,
}

impl FileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AssetRegistryLookup for FileRegistry {
    async fn registry(&self) -> Result<Registry> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read registry {}", self.path.display()))?;
        let registry = Registry::from_json(&text)?;
        debug!(
            "Loaded {} scripts from {}",
            registry.script_infos.len(),
            self.path.display()
        );
        Ok(registry)
    }
}
