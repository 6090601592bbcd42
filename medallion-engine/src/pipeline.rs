//! Pipeline capability traits
//!
//! Every implementation the registry can hand out satisfies the same two-step
//! contract: a factory builds an instance from `PipelineParameters`, and the
//! instance exposes a single `run`.

use anyhow::Result;
use medallion_core::domain::params::PipelineParameters;
use medallion_core::domain::pipeline::{PipelineDescriptor, PipelineKind};

/// A constructed pipeline, ready to run once
pub trait Pipeline {
    /// Perform the data movement
    ///
    /// Errors are implementation-defined; the invoker wraps them without
    /// retrying.
    fn run(&mut self) -> Result<()>;
}

/// Construction interface registered under a pipeline name
pub trait PipelineFactory: Send + Sync {
    /// Name and description; `descriptor().name` is the registry key
    fn descriptor(&self) -> PipelineDescriptor;

    /// Check that the implementation can be loaded
    ///
    /// Called on every resolution, before anything is constructed. The error
    /// message becomes the reason of a load error.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Build an instance for one invocation
    fn create(&self, params: PipelineParameters) -> Result<Box<dyn Pipeline>>;
}

/// Factory backed by a closure
///
/// Handy for registering small pipelines without a dedicated type.
pub struct FnFactory<F> {
    name: String,
    description: Option<String>,
    build: F,
}

impl<F> FnFactory<F>
where
    F: Fn(PipelineParameters) -> Result<Box<dyn Pipeline>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, build: F) -> Self {
        Self {
            name: name.into(),
            description: None,
            build,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl<F> PipelineFactory for FnFactory<F>
where
    F: Fn(PipelineParameters) -> Result<Box<dyn Pipeline>> + Send + Sync,
{
    fn descriptor(&self) -> PipelineDescriptor {
        PipelineDescriptor {
            name: self.name.clone(),
            kind: PipelineKind::Builtin,
            description: self.description.clone(),
            location: None,
        }
    }

    fn create(&self, params: PipelineParameters) -> Result<Box<dyn Pipeline>> {
        (self.build)(params)
    }
}
