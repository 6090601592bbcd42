//! `copy`: move source rows dated inside the range to the target table
//!
//! Target rows inside the range are replaced, rows outside it are kept, so
//! running the same range twice leaves the target unchanged.

use anyhow::{Context, Result};
use medallion_core::domain::params::PipelineParameters;
use medallion_core::domain::pipeline::{PipelineDescriptor, PipelineKind};
use medallion_core::store::{Row, TableId, TableStore, row_date};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::pipeline::{Pipeline, PipelineFactory};

pub const COPY_PIPELINE: &str = "copy";

pub struct CopyFactory {
    store: Arc<dyn TableStore>,
    date_column: String,
}

impl CopyFactory {
    pub fn new(store: Arc<dyn TableStore>, date_column: impl Into<String>) -> Self {
        Self {
            store,
            date_column: date_column.into(),
        }
    }
}

impl PipelineFactory for CopyFactory {
    fn descriptor(&self) -> PipelineDescriptor {
        PipelineDescriptor {
            name: COPY_PIPELINE.to_string(),
            kind: PipelineKind::Builtin,
            description: Some(format!(
                "Copy source rows with '{}' inside the range to the target",
                self.date_column
            )),
            location: None,
        }
    }

    fn create(&self, params: PipelineParameters) -> Result<Box<dyn Pipeline>> {
        Ok(Box::new(CopyPipeline {
            store: self.store.clone(),
            date_column: self.date_column.clone(),
            params,
        }))
    }
}

/// Summary of one copy run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub copied: usize,
    pub skipped: usize,
    pub replaced: usize,
    pub kept: usize,
}

pub struct CopyPipeline {
    store: Arc<dyn TableStore>,
    date_column: String,
    params: PipelineParameters,
}

impl CopyPipeline {
    /// Perform the copy and report what happened
    pub fn copy(&self) -> Result<CopyStats> {
        let source = TableId::parse(self.params.source()).context("invalid source table")?;
        let target = TableId::parse(self.params.target()).context("invalid target table")?;

        let source_rows = self
            .store
            .read(&source)
            .with_context(|| format!("failed to read source table '{}'", source))?;

        let mut stats = CopyStats::default();
        let mut selected = Vec::new();
        for row in source_rows {
            match row_date(&row, &self.date_column) {
                Some(date) if self.params.contains(date) => selected.push(row),
                Some(_) => {}
                None => stats.skipped += 1,
            }
        }
        if stats.skipped > 0 {
            warn!(
                table = %source,
                column = %self.date_column,
                skipped = stats.skipped,
                "skipped source rows without a usable date"
            );
        }

        let existing = self
            .store
            .read_or_empty(&target)
            .with_context(|| format!("failed to read target table '{}'", target))?;

        let mut merged: Vec<Row> = Vec::with_capacity(existing.len() + selected.len());
        for row in existing {
            let in_range = row_date(&row, &self.date_column)
                .map(|d| self.params.contains(d))
                .unwrap_or(false);
            if in_range {
                stats.replaced += 1;
            } else {
                merged.push(row);
            }
        }
        stats.kept = merged.len();
        stats.copied = selected.len();
        merged.extend(selected);

        debug!(table = %target, rows = merged.len(), "writing target table");
        self.store
            .write(&target, &merged)
            .with_context(|| format!("failed to write target table '{}'", target))?;

        info!(
            source = %source,
            target = %target,
            copied = stats.copied,
            replaced = stats.replaced,
            kept = stats.kept,
            "copy finished"
        );
        Ok(stats)
    }
}

impl Pipeline for CopyPipeline {
    fn run(&mut self) -> Result<()> {
        self.copy().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medallion_core::store::MemoryStore;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().unwrap().clone()
    }

    fn event(id: u32, date: &str) -> Row {
        row(json!({ "id": id, "event_date": date }))
    }

    fn table(id: &str) -> TableId {
        TableId::parse(id).unwrap()
    }

    fn pipeline(store: Arc<MemoryStore>, source: &str, target: &str) -> CopyPipeline {
        let params = PipelineParameters::parse(source, target, "2024-01-01", "2024-01-31").unwrap();
        CopyPipeline {
            store,
            date_column: "event_date".to_string(),
            params,
        }
    }

    fn ids(rows: &[Row]) -> Vec<u64> {
        rows.iter().map(|r| r["id"].as_u64().unwrap()).collect()
    }

    #[test]
    fn test_copies_rows_inside_inclusive_range() {
        let store = Arc::new(MemoryStore::new().with_table(
            table("bronze.events"),
            vec![
                event(1, "2023-12-31"),
                event(2, "2024-01-01"),
                event(3, "2024-01-15T08:30:00Z"),
                event(4, "2024-01-31"),
                event(5, "2024-02-01"),
            ],
        ));

        let stats = pipeline(store.clone(), "bronze.events", "silver.events")
            .copy()
            .unwrap();

        assert_eq!(stats.copied, 3);
        assert_eq!(stats.skipped, 0);
        let written = store.read(&table("silver.events")).unwrap();
        assert_eq!(ids(&written), vec![2, 3, 4]);
        assert_eq!(written[1], event(3, "2024-01-15T08:30:00Z"));
    }

    #[test]
    fn test_skips_rows_without_date() {
        let store = Arc::new(MemoryStore::new().with_table(
            table("bronze.events"),
            vec![
                event(1, "2024-01-10"),
                row(json!({ "id": 2 })),
                event(3, "yesterday"),
                row(json!({ "id": 4, "event_date": 20240110 })),
            ],
        ));

        let stats = pipeline(store.clone(), "bronze.events", "silver.events")
            .copy()
            .unwrap();

        assert_eq!(stats.copied, 1);
        assert_eq!(stats.skipped, 3);
        assert_eq!(ids(&store.read(&table("silver.events")).unwrap()), vec![1]);
    }

    #[test]
    fn test_replaces_range_and_keeps_the_rest() {
        let store = Arc::new(
            MemoryStore::new()
                .with_table(table("bronze.events"), vec![event(10, "2024-01-05")])
                .with_table(
                    table("silver.events"),
                    vec![
                        event(1, "2023-12-20"),
                        event(2, "2024-01-05"),
                        row(json!({ "id": 3 })),
                    ],
                ),
        );

        let stats = pipeline(store.clone(), "bronze.events", "silver.events")
            .copy()
            .unwrap();

        assert_eq!(stats.replaced, 1);
        assert_eq!(stats.kept, 2);
        assert_eq!(ids(&store.read(&table("silver.events")).unwrap()), vec![1, 3, 10]);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let store = Arc::new(MemoryStore::new().with_table(
            table("bronze.events"),
            vec![event(1, "2024-01-02"), event(2, "2024-01-03")],
        ));

        let mut copy = pipeline(store.clone(), "bronze.events", "silver.events");
        copy.run().unwrap();
        let first = store.read(&table("silver.events")).unwrap();
        copy.run().unwrap();
        let second = store.read(&table("silver.events")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_source_fails() {
        let store = Arc::new(MemoryStore::new());

        let err = pipeline(store.clone(), "bronze.events", "silver.events")
            .run()
            .unwrap_err();

        assert!(format!("{:#}", err).contains("bronze.events"));
        assert!(!store.exists(&table("silver.events")).unwrap());
    }

    #[test]
    fn test_invalid_table_identifier_fails_at_run() {
        let store = Arc::new(MemoryStore::new());
        let factory = CopyFactory::new(store, "event_date");
        let params =
            PipelineParameters::parse("../etc", "silver.events", "2024-01-01", "2024-01-02")
                .unwrap();

        let mut copy = factory.create(params).unwrap();
        let err = copy.run().unwrap_err();
        assert!(err.to_string().contains("invalid source table"));
    }

    #[test]
    fn test_descriptor_names_date_column() {
        let factory = CopyFactory::new(Arc::new(MemoryStore::new()), "ingested_on");
        let descriptor = factory.descriptor();

        assert_eq!(descriptor.name, "copy");
        assert_eq!(descriptor.kind, PipelineKind::Builtin);
        assert!(descriptor.description.unwrap().contains("ingested_on"));
    }
}
