//! Table store access for pipeline scripts

use crate::module::ScriptModule;
use medallion_core::store::{Row, TableId, TableStore};
use mlua::LuaSerdeExt;
use mlua::prelude::*;
use std::sync::Arc;

/// Tables module for pipeline scripts
///
/// Rows cross the Lua boundary as plain tables, converted through serde.
pub struct TablesModule {
    store: Arc<dyn TableStore>,
}

impl TablesModule {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }
}

fn table_id(id: &str) -> LuaResult<TableId> {
    TableId::parse(id).map_err(LuaError::external)
}

impl ScriptModule for TablesModule {
    fn id(&self) -> &'static str {
        "tables"
    }

    fn register(&self, lua: &Lua) -> LuaResult<()> {
        let tables = lua.create_table()?;

        // tables.exists(id)
        {
            let store = self.store.clone();
            tables.set(
                "exists",
                lua.create_function(move |_, id: String| {
                    store.exists(&table_id(&id)?).map_err(LuaError::external)
                })?,
            )?;
        }

        // tables.read(id) - errors if the table does not exist
        {
            let store = self.store.clone();
            tables.set(
                "read",
                lua.create_function(move |lua, id: String| {
                    let rows = store.read(&table_id(&id)?).map_err(LuaError::external)?;
                    lua.to_value(&rows)
                })?,
            )?;
        }

        // tables.write(id, rows) - replaces the table, returns the row count
        {
            let store = self.store.clone();
            tables.set(
                "write",
                lua.create_function(move |lua, (id, rows): (String, LuaValue)| {
                    let rows: Vec<Row> = match rows {
                        LuaValue::Table(ref t) if t.is_empty() => Vec::new(),
                        other => lua.from_value(other)?,
                    };
                    store
                        .write(&table_id(&id)?, &rows)
                        .map_err(LuaError::external)?;
                    Ok(rows.len())
                })?,
            )?;
        }

        lua.globals().set(self.id(), tables)?;
        Ok(())
    }

    fn stubs(&self) -> String {
        r#"---@meta

---Access to warehouse tables
---Identifiers look like "bronze.events" (layer.name) or a bare "events"
---@class tables
tables = {}

---Check whether a table exists
---@param id string Table identifier
---@return boolean exists
function tables.exists(id) end

---Read every row of a table
---Throws an error if the table does not exist
---@param id string Table identifier
---@return table[] rows Array of row tables
---
---@usage
---for _, row in ipairs(tables.read(params.source)) do ... end
function tables.read(id) end

---Replace the contents of a table
---@param id string Table identifier
---@param rows table[] Array of row tables
---@return integer count Number of rows written
function tables.write(id, rows) end
"#
        .to_string()
    }
}
