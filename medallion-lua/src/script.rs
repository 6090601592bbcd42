//! Pipeline script shape checking and loading
//!
//! A pipeline script evaluates to a table:
//!
//! ```lua
//! return {
//!     description = "Drop duplicate events",   -- optional
//!     run = function(params)                    -- required
//!         local rows = tables.read(params.source)
//!         tables.write(params.target, rows)
//!     end,
//! }
//! ```
//!
//! The shape is checked twice: once at resolution time in an inspection
//! sandbox whose modules discard their effects, and again when a pipeline
//! instance is built in its execution sandbox.

use mlua::{Function, Lua, Table, Value};
use thiserror::Error;

use crate::module::ModuleRegistry;
use crate::modules::{LogModule, NullSink};
use crate::sandbox::create_execution_sandbox;

/// Structural defects found in a pipeline script
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// The interpreter could not be prepared
    #[error("failed to create sandbox: {0}")]
    Sandbox(String),

    /// Syntax error or error raised while evaluating the top level
    #[error("script failed to evaluate: {0}")]
    Evaluation(String),

    #[error("script must return a table, got {0}")]
    NotATable(&'static str),

    #[error("script table has no 'run' function")]
    MissingRun,

    #[error("'run' must be a function, got {0}")]
    RunNotFunction(&'static str),

    #[error("'description' must be a string, got {0}")]
    InvalidDescription(&'static str),
}

/// What inspection learned about a well-formed script
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScriptShape {
    pub description: Option<String>,
}

/// A script evaluated inside a caller-provided sandbox
pub struct LoadedScript {
    pub shape: ScriptShape,
    pub definition: Table,
    pub run: Function,
}

/// Evaluate `source` in `lua` and validate the returned table
///
/// # Arguments
/// * `lua` - Sandbox with the modules the script may use already registered
/// * `chunk_name` - Name shown in Lua error messages and tracebacks
/// * `source` - The Lua source code
pub fn load_script(lua: &Lua, chunk_name: &str, source: &str) -> Result<LoadedScript, ShapeError> {
    let value: Value = lua
        .load(source)
        .set_name(format!("@{}", chunk_name))
        .eval()
        .map_err(|e| ShapeError::Evaluation(e.to_string()))?;

    let definition = match value {
        Value::Table(table) => table,
        other => return Err(ShapeError::NotATable(other.type_name())),
    };

    let run = match definition.raw_get::<Value>("run") {
        Ok(Value::Function(f)) => f,
        Ok(Value::Nil) => return Err(ShapeError::MissingRun),
        Ok(other) => return Err(ShapeError::RunNotFunction(other.type_name())),
        Err(e) => return Err(ShapeError::Evaluation(e.to_string())),
    };

    let description = match definition.raw_get::<Value>("description") {
        Ok(Value::Nil) => None,
        Ok(Value::String(s)) => Some(s.to_string_lossy().to_string()),
        Ok(other) => return Err(ShapeError::InvalidDescription(other.type_name())),
        Err(e) => return Err(ShapeError::Evaluation(e.to_string())),
    };

    Ok(LoadedScript {
        shape: ScriptShape { description },
        definition,
        run,
    })
}

/// Check the shape of a pipeline script without running it
///
/// The top level of the script is evaluated with a `log` module that drops
/// its messages. `params` and `tables` are not available at this point, so
/// scripts must only touch them inside `run`.
pub fn inspect_script(chunk_name: &str, source: &str) -> Result<ScriptShape, ShapeError> {
    let mut registry = ModuleRegistry::new();
    registry.register(LogModule::new(NullSink));

    let lua =
        create_execution_sandbox(&registry).map_err(|e| ShapeError::Sandbox(e.to_string()))?;

    load_script(&lua, chunk_name, source).map(|loaded| loaded.shape)
}

/// A pipeline script bound to its own execution sandbox
///
/// Built once per invocation; the interpreter lives exactly as long as the
/// instance.
pub struct ScriptInstance {
    run: Function,
    params: Value,
    _lua: Lua,
}

impl ScriptInstance {
    /// Create a sandbox with `modules`, evaluate the script in it and bind `run`
    pub fn new(
        modules: &ModuleRegistry,
        chunk_name: &str,
        source: &str,
    ) -> Result<Self, ShapeError> {
        let lua =
            create_execution_sandbox(modules).map_err(|e| ShapeError::Sandbox(e.to_string()))?;
        let loaded = load_script(&lua, chunk_name, source)?;
        let params = lua
            .globals()
            .raw_get::<Value>("params")
            .map_err(|e| ShapeError::Sandbox(e.to_string()))?;

        Ok(Self {
            run: loaded.run,
            params,
            _lua: lua,
        })
    }

    /// Call the script's `run` function
    ///
    /// The `params` global is passed as the only argument, or `nil` when no
    /// params module was registered. Return values are ignored.
    pub fn run(&self) -> mlua::Result<()> {
        self.run.call::<()>(self.params.clone())
    }
}
