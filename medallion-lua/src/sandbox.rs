//! Lua sandbox creation
//!
//! Pipeline scripts run in a restricted interpreter that cannot touch the
//! filesystem, the network or the process. Everything a script may do beyond
//! plain computation goes through the modules registered by the caller.

use mlua::{Lua, LuaOptions, Result as LuaResult, StdLib};

use crate::module::ModuleRegistry;

/// Create a restricted Lua sandbox
///
/// Only the table, string, utf8, math and coroutine libraries are loaded.
///
/// # Security
/// This sandbox prevents:
/// - File system access (`io`, `dofile`, `loadfile`)
/// - Process and clock access (`os`)
/// - Loading external modules via `require()`
pub fn create_sandbox() -> LuaResult<Lua> {
    let lua = Lua::new_with(
        StdLib::TABLE | StdLib::STRING | StdLib::UTF8 | StdLib::MATH | StdLib::COROUTINE,
        LuaOptions::default(),
    )?;

    let globals = lua.globals();
    globals.set("require", mlua::Nil)?;
    globals.set("dofile", mlua::Nil)?;
    globals.set("loadfile", mlua::Nil)?;

    Ok(lua)
}

/// Create a sandbox with every module of `registry` registered as a global
pub fn create_execution_sandbox(registry: &ModuleRegistry) -> LuaResult<Lua> {
    let lua = create_sandbox()?;
    registry.register_all(&lua)?;
    Ok(lua)
}
