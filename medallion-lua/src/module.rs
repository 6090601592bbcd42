//! Script module abstraction
//!
//! A module is a Lua global (`log`, `params`, `tables`) plus the LuaLS stub
//! describing it. Each pipeline instance gets its own registry.

use mlua::prelude::*;

/// Trait for modules exposed to pipeline scripts.
///
/// Each module registers functions and values into the Lua global scope under
/// a unique identifier.
///
/// # Example
///
/// ```rust
/// use medallion_lua::ScriptModule;
/// use mlua::prelude::*;
///
/// struct ClockModule;
///
/// impl ScriptModule for ClockModule {
///     fn id(&self) -> &'static str {
///         "clock"
///     }
///
///     fn register(&self, lua: &Lua) -> LuaResult<()> {
///         let table = lua.create_table()?;
///         table.set("epoch", lua.create_function(|_, ()| Ok(0))?)?;
///         lua.globals().set(self.id(), table)?;
///         Ok(())
///     }
///
///     fn stubs(&self) -> String {
///         "---@meta\n---@class clock\nclock = {}\n".to_string()
///     }
/// }
/// ```
pub trait ScriptModule: Send + Sync {
    /// Returns the unique identifier for this module.
    ///
    /// This identifier is the global variable name scripts use, e.g. `"log"`
    /// makes the module reachable as `log.info(...)`.
    ///
    /// # Requirements
    /// - Must be a valid Lua identifier
    /// - Must be unique across all registered modules
    fn id(&self) -> &'static str;

    /// Registers this module's functions and values into the Lua context.
    ///
    /// # Errors
    /// Returns `LuaError` if a table or function cannot be created.
    fn register(&self, lua: &Lua) -> LuaResult<()>;

    /// Generates Lua Language Server stubs for this module.
    ///
    /// The stub should start with `---@meta` to mark it as a definition file.
    fn stubs(&self) -> String;
}

/// Registry for managing script modules
///
/// The engine fills one registry per pipeline instance and loads it into that
/// instance's sandbox.
pub struct ModuleRegistry {
    modules: Vec<Box<dyn ScriptModule>>,
}

impl ModuleRegistry {
    /// Creates a new empty module registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Registers a module
    ///
    /// # Panics
    /// Panics if a module with the same ID is already registered
    pub fn register<M: ScriptModule + 'static>(&mut self, module: M) {
        let id = module.id();
        if self.modules.iter().any(|m| m.id() == id) {
            panic!("Module with id '{}' is already registered", id);
        }
        self.modules.push(Box::new(module));
    }

    /// Global names the registered modules occupy, in registration order
    pub fn ids(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.id()).collect()
    }

    /// Returns all registered modules
    pub fn modules(&self) -> &[Box<dyn ScriptModule>] {
        &self.modules
    }

    /// Registers all modules into a Lua context
    ///
    /// # Errors
    /// Returns the first error encountered during registration
    pub fn register_all(&self, lua: &Lua) -> LuaResult<()> {
        for module in &self.modules {
            module.register(lua)?;
        }
        Ok(())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
