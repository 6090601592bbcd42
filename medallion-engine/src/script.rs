//! Lua-backed pipelines
//!
//! Every `*.lua` file in the pipelines directory is registered under its file
//! stem. The source is kept in memory and shape-checked on every
//! resolution; construction gives each invocation its own interpreter.

use anyhow::{Context, Result};
use medallion_core::domain::log::LogLevel;
use medallion_core::domain::params::PipelineParameters;
use medallion_core::domain::pipeline::{PipelineDescriptor, PipelineKind};
use medallion_core::store::TableStore;
use medallion_lua::{
    LogModule, LogSink, ModuleRegistry, ParamsModule, ScriptInstance, TablesModule,
    inspect_script,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::pipeline::{Pipeline, PipelineFactory};

pub const SCRIPT_EXTENSION: &str = "lua";

/// Forwards `log.*` calls from a script to `tracing`
pub struct TracingLogSink {
    pipeline: String,
}

impl TracingLogSink {
    pub fn new(pipeline: impl Into<String>) -> Self {
        Self {
            pipeline: pipeline.into(),
        }
    }
}

impl LogSink for TracingLogSink {
    fn write(&mut self, level: LogLevel, message: &str) {
        let pipeline = self.pipeline.as_str();
        match level {
            LogLevel::Debug => debug!(target: "medallion::script", pipeline, "{}", message),
            LogLevel::Info => info!(target: "medallion::script", pipeline, "{}", message),
            LogLevel::Warning => warn!(target: "medallion::script", pipeline, "{}", message),
            LogLevel::Error => error!(target: "medallion::script", pipeline, "{}", message),
        }
    }
}

/// Factory for one pipeline script
pub struct ScriptFactory {
    name: String,
    path: PathBuf,
    source: String,
    description: Option<String>,
    store: Arc<dyn TableStore>,
}

impl ScriptFactory {
    /// Build a factory from source already in memory
    ///
    /// A script that fails inspection is still accepted here; the defect is
    /// reported when the pipeline is resolved.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        source: impl Into<String>,
        store: Arc<dyn TableStore>,
    ) -> Self {
        let name = name.into();
        let path = path.into();
        let source = source.into();
        let description = inspect_script(&chunk_name(&path), &source)
            .ok()
            .and_then(|shape| shape.description);

        Self {
            name,
            path,
            source,
            description,
            store,
        }
    }

    /// Read a script file, naming the pipeline after its file stem
    pub fn from_path(path: &Path, store: Arc<dyn TableStore>) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .with_context(|| format!("script '{}' has no usable file name", path.display()))?;
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read script '{}'", path.display()))?;

        Ok(Self::new(name, path, source, store))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn chunk_name(&self) -> String {
        chunk_name(&self.path)
    }

    fn modules(&self, params: PipelineParameters) -> ModuleRegistry {
        let mut modules = ModuleRegistry::new();
        modules.register(LogModule::new(TracingLogSink::new(self.name.as_str())));
        modules.register(ParamsModule::new(params));
        modules.register(TablesModule::new(self.store.clone()));
        modules
    }
}

fn chunk_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl PipelineFactory for ScriptFactory {
    fn descriptor(&self) -> PipelineDescriptor {
        PipelineDescriptor {
            name: self.name.clone(),
            kind: PipelineKind::Script,
            description: self.description.clone(),
            location: Some(self.path.clone()),
        }
    }

    fn validate(&self) -> Result<()> {
        inspect_script(&self.chunk_name(), &self.source)?;
        Ok(())
    }

    fn create(&self, params: PipelineParameters) -> Result<Box<dyn Pipeline>> {
        let modules = self.modules(params);
        let instance = ScriptInstance::new(&modules, &self.chunk_name(), &self.source)?;
        Ok(Box::new(ScriptPipeline {
            name: self.name.clone(),
            instance,
        }))
    }
}

/// A script bound to one invocation's interpreter
pub struct ScriptPipeline {
    name: String,
    instance: ScriptInstance,
}

impl Pipeline for ScriptPipeline {
    fn run(&mut self) -> Result<()> {
        self.instance
            .run()
            .with_context(|| format!("script pipeline '{}' raised an error", self.name))
    }
}

/// Find every pipeline script in `dir`, sorted by path
///
/// A missing directory yields no scripts. A path that exists but is not a
/// directory is an error.
pub fn discover_scripts(dir: &Path, store: Arc<dyn TableStore>) -> Result<Vec<ScriptFactory>> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "pipelines directory not found, no scripts loaded");
        return Ok(Vec::new());
    }
    if !dir.is_dir() {
        anyhow::bail!("pipelines path '{}' is not a directory", dir.display());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("failed to list pipelines directory '{}'", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut scripts = Vec::with_capacity(paths.len());
    for path in paths {
        let script = ScriptFactory::from_path(&path, store.clone())?;
        debug!(pipeline = script.name(), path = %path.display(), "discovered script");
        scripts.push(script);
    }
    Ok(scripts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medallion_core::store::{MemoryStore, Row, TableId};
    use serde_json::json;
    use tempfile::TempDir;

    const FILTER: &str = r#"
        return {
            description = "Keep rows dated inside the range",
            run = function(p)
                local out = {}
                for _, row in ipairs(tables.read(p.source)) do
                    if p.contains(row.event_date) then
                        table.insert(out, row)
                    end
                end
                log.info("kept " .. #out .. " rows")
                tables.write(p.target, out)
            end,
        }
    "#;

    fn params() -> PipelineParameters {
        PipelineParameters::parse("bronze.events", "silver.events", "2024-01-01", "2024-01-31")
            .unwrap()
    }

    fn store() -> Arc<MemoryStore> {
        let rows: Vec<Row> = [
            json!({ "id": 1, "event_date": "2024-01-10" }),
            json!({ "id": 2, "event_date": "2024-03-01" }),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();
        Arc::new(MemoryStore::new().with_table(TableId::parse("bronze.events").unwrap(), rows))
    }

    #[test]
    fn test_script_runs_against_store() {
        let store = store();
        let factory = ScriptFactory::new("filter", "filter.lua", FILTER, store.clone());

        assert!(factory.validate().is_ok());
        let descriptor = factory.descriptor();
        assert_eq!(descriptor.kind, PipelineKind::Script);
        assert_eq!(
            descriptor.description.as_deref(),
            Some("Keep rows dated inside the range")
        );

        let mut pipeline = factory.create(params()).unwrap();
        pipeline.run().unwrap();

        let written = store.read(&TableId::parse("silver.events").unwrap()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0]["id"], json!(1));
    }

    #[test]
    fn test_malformed_script_fails_validation() {
        let factory = ScriptFactory::new(
            "broken",
            "broken.lua",
            "return { description = 'no run' }",
            store(),
        );

        let err = factory.validate().unwrap_err();
        assert!(err.to_string().contains("no 'run' function"));
        assert_eq!(factory.descriptor().description, None);
    }

    #[test]
    fn test_runtime_error_surfaces_from_run() {
        let factory = ScriptFactory::new(
            "explode",
            "explode.lua",
            "return { run = function() error('bad row') end }",
            store(),
        );

        let mut pipeline = factory.create(params()).unwrap();
        let err = pipeline.run().unwrap_err();

        assert!(err.to_string().contains("explode"));
        assert!(format!("{:#}", err).contains("bad row"));
    }

    #[test]
    fn test_sandbox_blocks_io() {
        let factory = ScriptFactory::new(
            "escape",
            "escape.lua",
            "return { run = function() io.open('/etc/passwd') end }",
            store(),
        );

        let mut pipeline = factory.create(params()).unwrap();
        assert!(pipeline.run().is_err());
    }

    #[test]
    fn test_discover_scripts_sorted_by_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("zeta.lua"), FILTER).unwrap();
        fs::write(dir.path().join("alpha.lua"), FILTER).unwrap();
        fs::write(dir.path().join("README.md"), "not a pipeline").unwrap();
        fs::create_dir(dir.path().join("nested.lua")).unwrap();

        let scripts = discover_scripts(dir.path(), store()).unwrap();
        let names: Vec<_> = scripts.iter().map(|s| s.name()).collect();

        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(scripts[0].path(), dir.path().join("alpha.lua"));
    }

    #[test]
    fn test_discover_missing_directory() {
        let dir = TempDir::new().unwrap();
        let scripts = discover_scripts(&dir.path().join("absent"), store()).unwrap();
        assert!(scripts.is_empty());
    }

    #[test]
    fn test_discover_rejects_file_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("pipelines");
        fs::write(&file, "").unwrap();

        let err = match discover_scripts(&file, store()) {
            Ok(_) => panic!("a regular file is not a pipelines directory"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("not a directory"));
    }
}
