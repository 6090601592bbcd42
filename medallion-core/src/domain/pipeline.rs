//! Pipeline domain types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a registered pipeline implementation comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// Compiled into the binary
    Builtin,
    /// Loaded from a Lua script in the pipelines directory
    Script,
}

impl std::fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineKind::Builtin => write!(f, "builtin"),
            PipelineKind::Script => write!(f, "script"),
        }
    }
}

/// Descriptive information about a registered pipeline
///
/// Returned by the registry for listing and by resolved handles. Two handles
/// resolved from the same name carry equal descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDescriptor {
    pub name: String,
    pub kind: PipelineKind,
    pub description: Option<String>,
    /// Script path for scripted pipelines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
}
