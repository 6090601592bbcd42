//! In-memory table store

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{Row, StoreError, TableId, TableStore};

/// Table store that keeps everything in process memory
///
/// Useful for tests and dry runs where nothing should touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<BTreeMap<TableId, Vec<Row>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a table, replacing any previous contents
    pub fn with_table(self, table: TableId, rows: Vec<Row>) -> Self {
        self.tables
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(table, rows);
        self
    }
}

impl TableStore for MemoryStore {
    fn exists(&self, table: &TableId) -> Result<bool, StoreError> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        Ok(tables.contains_key(table))
    }

    fn read(&self, table: &TableId) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables
            .get(table)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(table.clone()))
    }

    fn write(&self, table: &TableId, rows: &[Row]) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables.insert(table.clone(), rows.to_vec());
        Ok(())
    }
}
