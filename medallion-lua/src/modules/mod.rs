//! Core modules for pipeline scripts
//!
//! Each module is registered as a Lua global named after its `id()`:
//! - `log`: forwards messages to a `LogSink`
//! - `params`: read-only view of the invocation parameters
//! - `tables`: access to the table store

pub mod log;
pub mod params;
pub mod tables;

pub use log::{LogModule, LogSink, NullSink};
pub use params::ParamsModule;
pub use tables::TablesModule;
