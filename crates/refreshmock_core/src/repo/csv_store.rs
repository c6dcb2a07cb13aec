//! Delimited-file record store.
//!
//! # Responsibility
//! - Persist each collection as `<name>.csv` under one data directory.
//! - Read rows by header name; tolerate short rows as missing values.
//!
//! # Invariants
//! - A collection file that does not exist reads as an empty collection.
//! - `write_all` writes a sibling temp file and renames it over the target,
//!   so a crash never leaves a half-written collection file behind.
//! - Header order: canonical columns first, then extra columns in the order
//!   they first appear in the written rows.

use crate::model::record::{Collection, Row};
use crate::repo::record_store::{RecordStore, StoreError, StoreResult};
use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const FILE_EXTENSION: &str = "csv";

/// CSV-backed record store rooted at one data directory.
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    data_dir: PathBuf,
}

impl CsvRecordStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file backing `collection`.
    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.data_dir
            .join(format!("{}.{FILE_EXTENSION}", collection.name()))
    }

    fn temp_path(&self, collection: Collection) -> PathBuf {
        self.data_dir
            .join(format!(".{}.{FILE_EXTENSION}.tmp", collection.name()))
    }
}

impl RecordStore for CsvRecordStore {
    fn read_all(&self, collection: Collection) -> StoreResult<Vec<Row>> {
        let path = self.collection_path(collection);
        let mut reader = match ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)
        {
            Ok(reader) => reader,
            Err(err) if is_not_found(&err) => {
                warn!(
                    "event=store_read module=repo backend=csv status=missing collection={} path={}",
                    collection,
                    path.display()
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let headers = reader.headers()?.clone();
        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(StoreError::InvalidData(format!(
                    "{} row {} has {} fields but header has {}",
                    path.display(),
                    index + 1,
                    record.len(),
                    headers.len()
                )));
            }
            rows.push(Row::from_pairs(headers.iter().zip(record.iter())));
        }

        debug!(
            "event=store_read module=repo backend=csv status=ok collection={} rows={}",
            collection,
            rows.len()
        );
        Ok(rows)
    }

    fn write_all(&self, collection: Collection, rows: &[Row]) -> StoreResult<()> {
        fs::create_dir_all(&self.data_dir)?;

        let header = header_for(collection, rows);
        let temp_path = self.temp_path(collection);
        {
            let mut writer = WriterBuilder::new().from_path(&temp_path)?;
            writer.write_record(&header)?;
            for row in rows {
                writer.write_record(header.iter().map(|column| row.get(column).unwrap_or("")))?;
            }
            writer.flush()?;
        }
        fs::rename(&temp_path, self.collection_path(collection))?;

        debug!(
            "event=store_write module=repo backend=csv status=ok collection={} rows={}",
            collection,
            rows.len()
        );
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "csv"
    }
}

fn header_for(collection: Collection, rows: &[Row]) -> Vec<String> {
    let mut header: Vec<String> = collection
        .columns()
        .iter()
        .map(|column| (*column).to_string())
        .collect();
    for row in rows {
        for column in row.columns() {
            if !header.iter().any(|existing| existing == column) {
                header.push(column.to_string());
            }
        }
    }
    header
}

fn is_not_found(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Io(io) if io.kind() == ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::{header_for, CsvRecordStore};
    use crate::model::record::{Collection, Row};
    use crate::repo::record_store::RecordStore;

    #[test]
    fn header_appends_extra_columns_after_schema() {
        let rows = vec![Row::from_pairs([("id", "1"), ("labels", "ui")])];
        let header = header_for(Collection::Projects, &rows);
        assert_eq!(header.last().map(String::as_str), Some("labels"));
        assert_eq!(header.len(), Collection::Projects.columns().len() + 1);
    }

    #[test]
    fn missing_file_reads_as_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvRecordStore::new(dir.path());
        assert!(store.read_all(Collection::Issues).unwrap().is_empty());
    }

    #[test]
    fn write_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvRecordStore::new(dir.path());
        store
            .write_all(Collection::Issues, &[Row::from_pairs([("id", "1")])])
            .unwrap();

        let names = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["issues.csv".to_string()]);
    }
}
