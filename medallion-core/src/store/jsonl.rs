//! JSON-lines table store
//!
//! Each table lives at `<root>/<layer>/<name>.jsonl`, one JSON object per line.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{Row, StoreError, TableId, TableStore};

const EXTENSION: &str = "jsonl";

/// File-backed store rooted at a warehouse directory
#[derive(Debug, Clone)]
pub struct JsonlStore {
    root: PathBuf,
}

impl JsonlStore {
    /// Creates a store rooted at `root`
    ///
    /// The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `table`
    pub fn path_for(&self, table: &TableId) -> PathBuf {
        self.root.join(table.relative_path(EXTENSION))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn write_rows(tmp: &Path, path: &Path, rows: &[Row]) -> Result<(), StoreError> {
    let file = File::create(tmp).map_err(io_error(tmp))?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        serde_json::to_writer(&mut writer, row).map_err(|source| StoreError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        writer.write_all(b"\n").map_err(io_error(tmp))?;
    }
    writer.flush().map_err(io_error(tmp))
}

impl TableStore for JsonlStore {
    fn exists(&self, table: &TableId) -> Result<bool, StoreError> {
        Ok(self.path_for(table).is_file())
    }

    fn read(&self, table: &TableId) -> Result<Vec<Row>, StoreError> {
        let path = self.path_for(table);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(table.clone()));
            }
            Err(e) => return Err(io_error(&path)(e)),
        };

        let mut rows = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(io_error(&path))?;
            if line.trim().is_empty() {
                continue;
            }
            let row: Row = serde_json::from_str(&line).map_err(|source| StoreError::Malformed {
                path: path.clone(),
                line: idx + 1,
                source,
            })?;
            rows.push(row);
        }

        Ok(rows)
    }

    fn write(&self, table: &TableId, rows: &[Row]) -> Result<(), StoreError> {
        let path = self.path_for(table);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }

        // Write beside the target and rename so readers never see a partial table
        let tmp = path.with_extension(format!("{}.tmp", EXTENSION));
        let result = write_rows(&tmp, &path, rows)
            .and_then(|()| fs::rename(&tmp, &path).map_err(io_error(&path)));
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }
}
