//! Logging module for pipeline scripts
//!
//! The module is generic over a `LogSink` so each context can decide where
//! script messages go:
//! - Engine: structured logging tagged with the pipeline name
//! - Shape inspection and stub generation: discarded

use crate::module::ScriptModule;
use medallion_core::domain::log::LogLevel;
use mlua::prelude::*;
use std::sync::{Arc, Mutex};

/// Trait for log sinks
///
/// # Thread Safety
/// Implementations must be Send to work with Lua's threading model.
pub trait LogSink: Send + Sync {
    /// Write a log message
    fn write(&mut self, level: LogLevel, message: &str);
}

/// Sink that drops every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn write(&mut self, _level: LogLevel, _message: &str) {}
}

/// Logging module for pipeline scripts
pub struct LogModule<S: LogSink> {
    sink: Arc<Mutex<S>>,
}

impl<S: LogSink> LogModule<S> {
    /// Creates a new LogModule with the provided sink
    pub fn new(sink: S) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }
}

const LEVELS: [(&str, LogLevel); 4] = [
    ("debug", LogLevel::Debug),
    ("info", LogLevel::Info),
    ("warning", LogLevel::Warning),
    ("error", LogLevel::Error),
];

impl<S: LogSink + 'static> ScriptModule for LogModule<S> {
    fn id(&self) -> &'static str {
        "log"
    }

    fn register(&self, lua: &Lua) -> LuaResult<()> {
        let log_table = lua.create_table()?;

        for (name, level) in LEVELS {
            let sink = self.sink.clone();
            log_table.set(
                name,
                lua.create_function(move |_, msg: String| {
                    sink.lock()
                        .map_err(|e| LuaError::RuntimeError(format!("Failed to lock sink: {}", e)))?
                        .write(level, &msg);
                    Ok(())
                })?,
            )?;
        }

        lua.globals().set(self.id(), log_table)?;
        Ok(())
    }

    fn stubs(&self) -> String {
        r#"---@meta

---Logging module for Medallion pipelines
---@class log
log = {}

---Log a debug message
---@param msg string The message to log
function log.debug(msg) end

---Log an info message
---@param msg string The message to log
function log.info(msg) end

---Log a warning message
---@param msg string The message to log
function log.warning(msg) end

---Log an error message
---@param msg string The message to log
function log.error(msg) end
"#
        .to_string()
    }
}
