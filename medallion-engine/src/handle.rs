//! Resolved pipelines and their instances

use medallion_core::domain::params::{PipelineName, PipelineParameters};
use medallion_core::domain::pipeline::PipelineDescriptor;
use std::sync::Arc;
use tracing::debug;

use crate::error::ResolveError;
use crate::pipeline::{Pipeline, PipelineFactory};

/// A resolved pipeline implementation
///
/// Owned by one invocation and consumed by `construct`, so a handle builds at
/// most one instance.
pub struct PipelineHandle {
    name: PipelineName,
    factory: Arc<dyn PipelineFactory>,
}

impl PipelineHandle {
    pub fn new(name: PipelineName, factory: Arc<dyn PipelineFactory>) -> Self {
        Self { name, factory }
    }

    pub fn name(&self) -> &PipelineName {
        &self.name
    }

    pub fn descriptor(&self) -> PipelineDescriptor {
        self.factory.descriptor()
    }

    /// Build the instance for this invocation
    ///
    /// # Errors
    /// A factory that fails to build is reported as `ResolveError::Load`.
    pub fn construct(self, params: PipelineParameters) -> Result<PipelineInstance, ResolveError> {
        debug!(pipeline = %self.name, "constructing pipeline");
        let pipeline = self
            .factory
            .create(params)
            .map_err(|e| ResolveError::Load {
                name: self.name.to_string(),
                reason: format!("{:#}", e),
            })?;

        Ok(PipelineInstance { pipeline })
    }
}

impl std::fmt::Debug for PipelineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineHandle")
            .field("name", &self.name)
            .field("descriptor", &self.factory.descriptor())
            .finish()
    }
}

/// A constructed pipeline bound to its parameters
///
/// `run` consumes the instance: one instance, one run.
pub struct PipelineInstance {
    pipeline: Box<dyn Pipeline>,
}

impl PipelineInstance {
    pub fn run(mut self) -> anyhow::Result<()> {
        self.pipeline.run()
    }
}
