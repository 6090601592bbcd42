//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod check;
mod init;
mod list;
mod run;

pub use init::InitCommands;
pub use run::RunArgs;

use anyhow::Result;
use clap::Subcommand;
use medallion_engine::EngineConfig;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run one pipeline over a date range
    Run(RunArgs),
    /// List registered pipelines
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve and shape-check a pipeline without running it
    Check {
        /// Pipeline name
        name: String,
    },
    /// Initialize development environment
    Init {
        #[command(subcommand)]
        command: InitCommands,
    },
}

/// Route a command to its handler
pub fn handle_command(command: Commands, config: &EngineConfig) -> Result<()> {
    match command {
        Commands::Run(args) => run::handle_run(args, config),
        Commands::List { json } => list::handle_list(config, json),
        Commands::Check { name } => check::handle_check(&name, config),
        Commands::Init { command } => init::handle_init_command(command),
    }
}
