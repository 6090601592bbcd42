//! `medallion check`

use anyhow::Result;
use colored::*;
use medallion_core::domain::params::PipelineName;
use medallion_engine::{EngineConfig, InvocationError, PipelineResolver};

pub fn handle_check(name: &str, config: &EngineConfig) -> Result<()> {
    let registry = config.build_registry()?;
    let name = PipelineName::new(name).map_err(InvocationError::from)?;
    let handle = registry.resolve(&name).map_err(InvocationError::from)?;
    let descriptor = handle.descriptor();

    println!("{}", "✓ Pipeline is loadable".green().bold());
    println!("  Name: {}", descriptor.name.bold());
    println!("  Kind: {}", descriptor.kind);
    if let Some(description) = &descriptor.description {
        println!("  Description: {}", description.dimmed());
    }
    if let Some(location) = &descriptor.location {
        println!("  Location: {}", location.display().to_string().cyan());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> EngineConfig {
        EngineConfig::new(dir.path().join("warehouse")).with_pipelines_dir(dir.path())
    }

    fn exit_code(err: &anyhow::Error) -> Option<u8> {
        err.downcast_ref::<InvocationError>().map(InvocationError::exit_code)
    }

    #[test]
    fn test_check_builtin() {
        let dir = TempDir::new().unwrap();
        assert!(handle_check("copy", &config(&dir)).is_ok());
    }

    #[test]
    fn test_check_unknown() {
        let dir = TempDir::new().unwrap();
        let err = handle_check("nonexistent_pipeline", &config(&dir)).unwrap_err();
        assert_eq!(exit_code(&err), Some(3));
    }

    #[test]
    fn test_check_malformed_script() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("half.lua"), "return 1").unwrap();

        let err = handle_check("half", &config(&dir)).unwrap_err();
        assert_eq!(exit_code(&err), Some(4));
        assert!(err.to_string().contains("must return a table"));
    }
}
