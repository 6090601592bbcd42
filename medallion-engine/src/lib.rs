//! Medallion Engine
//!
//! Resolves pipelines by name and drives one invocation to completion.
//!
//! Architecture:
//! - Pipeline: the `Pipeline` / `PipelineFactory` capability traits
//! - Registry: name → factory lookup with shape validation on resolve
//! - Handle: a resolved factory, consumed by construction
//! - Invoker: parse → resolve → construct → run, with typed errors
//! - Built-ins and scripts: the implementations registered at startup

pub mod builtin;
pub mod config;
pub mod error;
pub mod handle;
pub mod invoker;
pub mod pipeline;
pub mod registry;
pub mod script;

pub use config::EngineConfig;
pub use error::{ErrorKind, InvocationError, ResolveError};
pub use handle::{PipelineHandle, PipelineInstance};
pub use invoker::{InvocationRequest, InvocationResult, Invoker};
pub use pipeline::{FnFactory, Pipeline, PipelineFactory};
pub use registry::{PipelineRegistry, PipelineResolver, RegistryError};
