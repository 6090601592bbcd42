//! Pipeline registry
//!
//! Maps pipeline names to factories. The registry is filled once at startup
//! and is read-only afterwards; resolving never mutates it.

use medallion_core::domain::params::{ParamError, PipelineName, PipelineParameters};
use medallion_core::domain::pipeline::PipelineDescriptor;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::error::ResolveError;
use crate::handle::PipelineHandle;
use crate::pipeline::{FnFactory, Pipeline, PipelineFactory};

/// Anything that can turn a pipeline name into a handle
///
/// The invoker depends on this trait rather than on `PipelineRegistry` so
/// resolution can be observed or replaced in tests.
pub trait PipelineResolver {
    fn resolve(&self, name: &PipelineName) -> Result<PipelineHandle, ResolveError>;
}

impl<R: PipelineResolver + ?Sized> PipelineResolver for &R {
    fn resolve(&self, name: &PipelineName) -> Result<PipelineHandle, ResolveError> {
        (**self).resolve(name)
    }
}

/// Errors raised while filling the registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("pipeline '{0}' is already registered")]
    Duplicate(String),

    #[error("invalid pipeline name: {0}")]
    InvalidName(#[from] ParamError),
}

/// Registry for pipeline implementations
#[derive(Default)]
pub struct PipelineRegistry {
    factories: BTreeMap<PipelineName, Arc<dyn PipelineFactory>>,
}

impl PipelineRegistry {
    /// Creates a new empty pipeline registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `factory.descriptor().name`
    ///
    /// # Errors
    /// - `RegistryError::InvalidName` if the name is empty
    /// - `RegistryError::Duplicate` if the name is taken
    pub fn register<F: PipelineFactory + 'static>(&mut self, factory: F) -> Result<(), RegistryError> {
        let name = PipelineName::new(factory.descriptor().name)?;
        if self.factories.contains_key(&name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        debug!(pipeline = %name, "registered pipeline");
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    /// Registers a closure as a built-in pipeline
    pub fn register_fn<F>(&mut self, name: impl Into<String>, build: F) -> Result<(), RegistryError>
    where
        F: Fn(PipelineParameters) -> anyhow::Result<Box<dyn Pipeline>> + Send + Sync + 'static,
    {
        self.register(FnFactory::new(name, build))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.keys().any(|n| n.as_str() == name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().map(|n| n.to_string()).collect()
    }

    /// Descriptors of every registered pipeline, sorted by name
    pub fn descriptors(&self) -> Vec<PipelineDescriptor> {
        self.factories.values().map(|f| f.descriptor()).collect()
    }
}

impl std::fmt::Debug for PipelineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRegistry")
            .field("pipelines", &self.names())
            .finish()
    }
}

impl PipelineResolver for PipelineRegistry {
    fn resolve(&self, name: &PipelineName) -> Result<PipelineHandle, ResolveError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ResolveError::Unknown {
                name: name.to_string(),
                known: self.names(),
            })?;

        factory.validate().map_err(|e| ResolveError::Load {
            name: name.to_string(),
            reason: format!("{:#}", e),
        })?;

        debug!(pipeline = %name, "resolved pipeline");
        Ok(PipelineHandle::new(name.clone(), factory.clone()))
    }
}
