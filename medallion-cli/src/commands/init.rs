//! Init command handlers
//!
//! Writes `.luarc.json` and LuaLS stub files so pipeline scripts get
//! completion for the script modules.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use medallion_core::domain::params::PipelineParameters;
use medallion_core::store::MemoryStore;
use medallion_lua::{LogModule, ModuleRegistry, NullSink, ParamsModule, TablesModule};
use std::fs;
use std::path::Path;
use std::sync::Arc;

const STUBS_DIR: [&str; 2] = [".medallion", "stubs"];

/// Init subcommands
#[derive(Subcommand)]
pub enum InitCommands {
    /// Generate Lua development files (.luarc.json and stubs)
    Lua {
        /// Output directory for generated files
        #[arg(short, long, default_value = ".")]
        output: String,

        /// Generate only .luarc.json
        #[arg(long)]
        config_only: bool,

        /// Generate only stub files
        #[arg(long)]
        stubs_only: bool,
    },
}

pub fn handle_init_command(command: InitCommands) -> Result<()> {
    match command {
        InitCommands::Lua {
            output,
            config_only,
            stubs_only,
        } => {
            let output = Path::new(&output);
            if !stubs_only {
                generate_luarc_json(output)?;
            }
            if !config_only {
                generate_stub_files(output)?;
            }

            println!("{}", "✓ Lua development files generated!".green().bold());
            println!();
            println!("{}", "Next steps:".bold());
            println!("  1. Install Lua Language Server in your editor");
            println!("  2. Put pipeline scripts in your pipelines directory");
            println!("  3. Use {} to verify a script", "medallion check <NAME>".cyan());
            Ok(())
        }
    }
}

/// Modules with inert backends; only their stubs are used
fn stub_modules() -> Result<ModuleRegistry> {
    let params =
        PipelineParameters::parse("bronze.example", "silver.example", "2024-01-01", "2024-01-01")?;

    let mut modules = ModuleRegistry::new();
    modules.register(LogModule::new(NullSink));
    modules.register(ParamsModule::new(params));
    modules.register(TablesModule::new(Arc::new(MemoryStore::new())));
    Ok(modules)
}

fn luarc_json(modules: &ModuleRegistry) -> Result<String> {
    let globals = modules.ids();
    let luarc = serde_json::json!({
        "$schema": "https://raw.githubusercontent.com/sumneko/vscode-lua/master/setting/schema.json",
        "runtime": { "version": "Lua 5.4" },
        "diagnostics": { "globals": globals },
        "workspace": {
            "library": [STUBS_DIR.join("/")],
            "checkThirdParty": false
        },
        "completion": { "callSnippet": "Both" }
    });
    Ok(serde_json::to_string_pretty(&luarc)? + "\n")
}

fn generate_luarc_json(output: &Path) -> Result<()> {
    let luarc_path = output.join(".luarc.json");
    let content = luarc_json(&stub_modules()?)?;

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {:?}", output))?;
    fs::write(&luarc_path, content)
        .with_context(|| format!("Failed to write .luarc.json to {:?}", luarc_path))?;

    println!("  {} .luarc.json", "Created".green());
    Ok(())
}

/// Stubs come from the module implementations, so they match what scripts see
fn generate_stub_files(output: &Path) -> Result<()> {
    let stubs_dir = STUBS_DIR.iter().fold(output.to_path_buf(), |p, c| p.join(c));
    fs::create_dir_all(&stubs_dir)
        .with_context(|| format!("Failed to create stubs directory at {:?}", stubs_dir))?;

    for module in stub_modules()?.modules() {
        let stub_path = stubs_dir.join(format!("{}.lua", module.id()));
        fs::write(&stub_path, module.stubs())
            .with_context(|| format!("Failed to write stub file {:?}", stub_path))?;

        println!("  {} {}.lua", "Created".green(), module.id());
    }

    println!(
        "  {} in {}",
        "Stubs ready".green(),
        stubs_dir.display().to_string().cyan()
    );
    Ok(())
}
