//! Medallion Lua Infrastructure
//!
//! Lets data pipelines be written as Lua scripts. It includes:
//! - Module trait and registry for the globals exposed to scripts
//! - A restricted sandbox without I/O, OS access or `require`
//! - Core module implementations (`log`, `params`, `tables`)
//! - Script shape inspection and loading

pub mod module;
pub mod modules;
pub mod sandbox;
pub mod script;

pub use module::{ModuleRegistry, ScriptModule};
pub use modules::{LogModule, LogSink, NullSink, ParamsModule, TablesModule};
pub use sandbox::{create_execution_sandbox, create_sandbox};
pub use script::{
    LoadedScript, ScriptInstance, ScriptShape, ShapeError, inspect_script, load_script,
};
