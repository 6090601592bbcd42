//! Compiled-in pipelines

pub mod copy;

use medallion_core::store::TableStore;
use std::sync::Arc;

use crate::registry::{PipelineRegistry, RegistryError};

pub use copy::{CopyFactory, CopyPipeline};

/// Register every built-in pipeline against `store`
pub fn register_builtins(
    registry: &mut PipelineRegistry,
    store: Arc<dyn TableStore>,
    date_column: &str,
) -> Result<(), RegistryError> {
    registry.register(CopyFactory::new(store, date_column))?;
    Ok(())
}
