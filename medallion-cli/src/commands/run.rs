//! `medallion run`

use anyhow::Result;
use clap::Args;
use colored::*;
use medallion_engine::{EngineConfig, InvocationRequest, InvocationResult, Invoker};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Registered pipeline name
    #[arg(long)]
    pub pipeline_name: String,

    /// Source table, e.g. bronze.events
    #[arg(long)]
    pub source: String,

    /// Target table, e.g. silver.events
    #[arg(long)]
    pub target: String,

    /// First day of the range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub start_date: String,

    /// Last day of the range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub end_date: String,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    fn request(&self) -> InvocationRequest {
        InvocationRequest::new(
            self.pipeline_name.as_str(),
            self.source.as_str(),
            self.target.as_str(),
            self.start_date.as_str(),
            self.end_date.as_str(),
        )
    }
}

pub fn handle_run(args: RunArgs, config: &EngineConfig) -> Result<()> {
    let registry = config.build_registry()?;
    let invoker = Invoker::new(&registry);
    let result = invoker.invoke(&args.request())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn print_summary(result: &InvocationResult) {
    let params = &result.parameters;
    println!("{}", "✓ Pipeline completed".green().bold());
    println!("  Pipeline: {}", result.pipeline.as_str().bold());
    println!("  Run:      {}", result.run_id.to_string().cyan());
    println!(
        "  Tables:   {} → {}",
        params.source(),
        params.target()
    );
    println!(
        "  Range:    {} .. {} ({} days)",
        params.start_date(),
        params.end_date(),
        params.days()
    );
    println!(
        "  Elapsed:  {}",
        format!("{} ms", result.elapsed_ms).dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use medallion_core::store::{JsonlStore, Row, TableId, TableStore};
    use medallion_engine::InvocationError;
    use serde_json::json;
    use tempfile::TempDir;

    fn args(start_date: &str, end_date: &str) -> RunArgs {
        RunArgs {
            pipeline_name: "copy".to_string(),
            source: "bronze.events".to_string(),
            target: "silver.events".to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            json: true,
        }
    }

    fn warehouse() -> (TempDir, EngineConfig) {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::new(dir.path().join("warehouse"))
            .with_pipelines_dir(dir.path().join("pipelines"));

        let rows: Vec<Row> = [
            json!({ "id": 1, "event_date": "2024-01-05" }),
            json!({ "id": 2, "event_date": "2024-02-05" }),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();
        JsonlStore::new(&config.warehouse_root)
            .write(&TableId::parse("bronze.events").unwrap(), &rows)
            .unwrap();

        (dir, config)
    }

    #[test]
    fn test_handle_run_writes_target() {
        let (_dir, config) = warehouse();

        handle_run(args("2024-01-01", "2024-01-31"), &config).unwrap();

        let target = config.warehouse_root.join("silver").join("events.jsonl");
        assert!(target.is_file());
        let written = JsonlStore::new(&config.warehouse_root)
            .read(&TableId::parse("silver.events").unwrap())
            .unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0]["id"], json!(1));
    }

    #[test]
    fn test_handle_run_bad_date_exits_two() {
        let (_dir, config) = warehouse();

        let err = handle_run(args("2024/01/01", "2024-01-31"), &config).unwrap_err();

        let code = err
            .downcast_ref::<InvocationError>()
            .map(InvocationError::exit_code);
        assert_eq!(code, Some(2));
        assert!(!config.warehouse_root.join("silver").exists());
    }

    #[test]
    fn test_request_carries_flags_verbatim() {
        let args = RunArgs {
            pipeline_name: "copy".to_string(),
            source: "bronze.events".to_string(),
            target: "silver.events".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-31".to_string(),
            json: false,
        };

        assert_eq!(
            args.request(),
            InvocationRequest::new(
                "copy",
                "bronze.events",
                "silver.events",
                "2024-01-01",
                "2024-01-31"
            )
        );
    }
}
