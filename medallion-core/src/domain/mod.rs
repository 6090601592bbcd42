//! Core domain types
//!
//! These types are shared between the script layer (which exposes them to Lua),
//! the engine (which resolves and runs pipelines) and the CLI (which builds them
//! from user input).

pub mod log;
pub mod params;
pub mod pipeline;
