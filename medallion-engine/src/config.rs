//! Engine configuration
//!
//! Where tables live, where pipeline scripts are discovered, and which
//! column the built-in pipelines read dates from.

use anyhow::{Context, Result};
use medallion_core::store::{JsonlStore, TableStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::builtin::register_builtins;
use crate::registry::PipelineRegistry;
use crate::script::discover_scripts;

pub const DEFAULT_WAREHOUSE_ROOT: &str = "warehouse";
pub const DEFAULT_PIPELINES_DIR: &str = "pipelines/silver";
pub const DEFAULT_DATE_COLUMN: &str = "event_date";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Root directory of the JSONL table store
    pub warehouse_root: PathBuf,

    /// Directory scanned for `*.lua` pipeline scripts
    pub pipelines_dir: PathBuf,

    /// Column holding the row date for built-in pipelines
    pub date_column: String,
}

impl EngineConfig {
    pub fn new(warehouse_root: impl Into<PathBuf>) -> Self {
        Self {
            warehouse_root: warehouse_root.into(),
            pipelines_dir: PathBuf::from(DEFAULT_PIPELINES_DIR),
            date_column: DEFAULT_DATE_COLUMN.to_string(),
        }
    }

    pub fn with_pipelines_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pipelines_dir = dir.into();
        self
    }

    pub fn with_date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = column.into();
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.warehouse_root.as_os_str().is_empty() {
            anyhow::bail!("warehouse_root cannot be empty");
        }

        if self.date_column.trim().is_empty() {
            anyhow::bail!("date_column cannot be empty");
        }

        if self.pipelines_dir.exists() && !self.pipelines_dir.is_dir() {
            anyhow::bail!(
                "pipelines_dir '{}' is not a directory",
                self.pipelines_dir.display()
            );
        }

        Ok(())
    }

    /// The table store described by this configuration
    pub fn store(&self) -> Arc<dyn TableStore> {
        Arc::new(JsonlStore::new(self.warehouse_root.clone()))
    }

    /// Build the registry: built-ins first, then discovered scripts
    ///
    /// # Errors
    /// Fails on an invalid configuration, an unreadable pipelines directory,
    /// or a script whose name collides with another pipeline.
    pub fn build_registry(&self) -> Result<PipelineRegistry> {
        self.validate()?;

        let store = self.store();
        let mut registry = PipelineRegistry::new();
        register_builtins(&mut registry, store.clone(), &self.date_column)
            .context("failed to register built-in pipelines")?;

        for script in discover_scripts(&self.pipelines_dir, store)? {
            let path = script.path().display().to_string();
            registry
                .register(script)
                .with_context(|| format!("failed to register script '{}'", path))?;
        }

        info!(
            pipelines = registry.len(),
            warehouse = %self.warehouse_root.display(),
            "pipeline registry ready"
        );
        Ok(registry)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WAREHOUSE_ROOT)
    }
}
