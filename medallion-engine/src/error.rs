//! Error types for resolving and invoking pipelines

use medallion_core::domain::params::ParamError;
use thiserror::Error;
use uuid::Uuid;

/// Broad failure category, used to pick a process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameters,
    UnknownPipeline,
    Load,
    Execution,
}

impl ErrorKind {
    /// Process exit code reported for this category
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorKind::Execution => 1,
            ErrorKind::InvalidParameters => 2,
            ErrorKind::UnknownPipeline => 3,
            ErrorKind::Load => 4,
        }
    }
}

fn known_list(known: &[String]) -> String {
    if known.is_empty() {
        "none registered".to_string()
    } else {
        known.join(", ")
    }
}

/// Errors raised by a registry while resolving or constructing a pipeline
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Nothing is registered under the requested name
    #[error("unknown pipeline '{name}' (known pipelines: {})", known_list(.known))]
    Unknown { name: String, known: Vec<String> },

    /// The implementation is registered but cannot be loaded or built
    #[error("failed to load pipeline '{name}': {reason}")]
    Load { name: String, reason: String },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Unknown { .. } => ErrorKind::UnknownPipeline,
            ResolveError::Load { .. } => ErrorKind::Load,
        }
    }
}

/// Errors raised by one invocation
#[derive(Debug, Error)]
pub enum InvocationError {
    /// Caller input was rejected before anything was resolved
    #[error(transparent)]
    InvalidParameters(#[from] ParamError),

    /// Resolution or construction failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The pipeline's `run` failed; `source` is the pipeline's own error
    #[error("pipeline '{name}' failed during run {run_id}")]
    Execution {
        name: String,
        run_id: Uuid,
        #[source]
        source: anyhow::Error,
    },
}

impl InvocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InvocationError::InvalidParameters(_) => ErrorKind::InvalidParameters,
            InvocationError::Resolve(e) => e.kind(),
            InvocationError::Execution { .. } => ErrorKind::Execution,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}
