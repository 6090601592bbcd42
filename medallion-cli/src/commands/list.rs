//! `medallion list`

use anyhow::Result;
use colored::*;
use medallion_core::domain::pipeline::{PipelineDescriptor, PipelineKind};
use medallion_engine::EngineConfig;

pub fn handle_list(config: &EngineConfig, json: bool) -> Result<()> {
    let registry = config.build_registry()?;
    let pipelines = registry.descriptors();

    if json {
        println!("{}", to_json(&pipelines)?);
        return Ok(());
    }

    if pipelines.is_empty() {
        println!("{}", "No pipelines registered".yellow());
        return Ok(());
    }

    println!("{}", "Pipelines:".bold());
    for pipeline in &pipelines {
        println!("{}", format_line(pipeline));
    }
    Ok(())
}

fn to_json(pipelines: &[PipelineDescriptor]) -> Result<String> {
    Ok(serde_json::to_string_pretty(pipelines)?)
}

fn format_line(pipeline: &PipelineDescriptor) -> String {
    let kind = match pipeline.kind {
        PipelineKind::Builtin => "builtin".blue(),
        PipelineKind::Script => "script".magenta(),
    };
    let mut line = format!("  {:<24} {:<8}", pipeline.name.cyan(), kind);
    if let Some(description) = &pipeline.description {
        line.push(' ');
        line.push_str(&description.dimmed().to_string());
    }
    line
}
