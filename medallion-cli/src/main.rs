//! Medallion CLI
//!
//! Command-line launcher for medallion pipelines.

mod commands;
mod logging;

use clap::Parser;
use colored::*;
use commands::{Commands, handle_command};
use medallion_engine::EngineConfig;
use medallion_engine::InvocationError;
use medallion_engine::config::{DEFAULT_DATE_COLUMN, DEFAULT_PIPELINES_DIR, DEFAULT_WAREHOUSE_ROOT};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "medallion")]
#[command(about = "Run medallion data pipelines by name", long_about = None)]
struct Cli {
    /// Root directory of the table store
    #[arg(long, global = true, env = "MEDALLION_WAREHOUSE", default_value = DEFAULT_WAREHOUSE_ROOT)]
    warehouse: PathBuf,

    /// Directory scanned for Lua pipeline scripts
    #[arg(long, global = true, env = "MEDALLION_PIPELINES_DIR", default_value = DEFAULT_PIPELINES_DIR)]
    pipelines_dir: PathBuf,

    /// Column holding the row date for built-in pipelines
    #[arg(long, global = true, env = "MEDALLION_DATE_COLUMN", default_value = DEFAULT_DATE_COLUMN)]
    date_column: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let config = EngineConfig::new(cli.warehouse)
        .with_pipelines_dir(cli.pipelines_dir)
        .with_date_column(cli.date_column);

    match handle_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Exit code for a failed command
///
/// Invocation failures carry their own code; anything else is 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<InvocationError>())
        .map(InvocationError::exit_code)
        .unwrap_or(1)
}

fn report(err: &anyhow::Error) {
    eprintln!("{} {}", "error:".red().bold(), err);
    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
    }
}
