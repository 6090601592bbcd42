//! Read-only view of the invocation parameters
//!
//! Scripts see the same four values a compiled pipeline receives at
//! construction, as strings, plus a range check helper.

use crate::module::ScriptModule;
use medallion_core::domain::params::PipelineParameters;
use medallion_core::store::parse_day;
use mlua::prelude::*;

/// Parameters module for pipeline scripts
pub struct ParamsModule {
    params: PipelineParameters,
}

impl ParamsModule {
    pub fn new(params: PipelineParameters) -> Self {
        Self { params }
    }
}

impl ScriptModule for ParamsModule {
    fn id(&self) -> &'static str {
        "params"
    }

    fn register(&self, lua: &Lua) -> LuaResult<()> {
        let table = lua.create_table()?;
        table.set("source", self.params.source())?;
        table.set("target", self.params.target())?;
        table.set("start_date", self.params.start_date().to_string())?;
        table.set("end_date", self.params.end_date().to_string())?;

        // params.contains(date) - false for values that are not dates
        let params = self.params.clone();
        table.set(
            "contains",
            lua.create_function(move |_, value: LuaValue| {
                let day = match value {
                    LuaValue::String(s) => s.to_str().ok().and_then(|s| parse_day(&s)),
                    _ => None,
                };
                Ok(day.is_some_and(|day| params.contains(day)))
            })?,
        )?;

        lua.globals().set(self.id(), table)?;
        Ok(())
    }

    fn stubs(&self) -> String {
        r#"---@meta

---Invocation parameters, read-only
---@class params
---@field source string Source table identifier, e.g. "bronze.events"
---@field target string Target table identifier, e.g. "silver.events"
---@field start_date string First day of the range (YYYY-MM-DD, inclusive)
---@field end_date string Last day of the range (YYYY-MM-DD, inclusive)
params = {}

---Check whether a date falls inside [start_date, end_date]
---Accepts "YYYY-MM-DD" or a timestamp starting with one; anything else returns false
---@param date any The value to check
---@return boolean inside
---
---@usage
---if params.contains(row.event_date) then ... end
function params.contains(date) end
"#
        .to_string()
    }
}
