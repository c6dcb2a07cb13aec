//! SQLite record store.
//!
//! # Responsibility
//! - Persist each collection as one table of TEXT columns.
//! - Preserve store order through the `row_order` key.
//!
//! # Invariants
//! - `write_all` replaces table contents in a single transaction.
//! - NULL columns read back as absent fields.
//! - Only canonical columns are persisted; extra row columns are dropped.

use crate::db::{open_db, open_db_in_memory};
use crate::model::record::{Collection, Row};
use crate::repo::record_store::{lock_poisoned, RecordStore, StoreResult};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use std::sync::Mutex;

/// File name used when the store is opened from a data directory.
pub const SQLITE_FILE_NAME: &str = "refreshmock.sqlite3";

/// SQLite-backed record store.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Wraps an already-migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens `<data_dir>/refreshmock.sqlite3`, creating the directory.
    pub fn open_in_dir(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        Self::open(data_dir.as_ref().join(SQLITE_FILE_NAME))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }
}

impl RecordStore for SqliteRecordStore {
    fn read_all(&self, collection: Collection) -> StoreResult<Vec<Row>> {
        let conn = self.conn.lock().map_err(lock_poisoned)?;
        let columns = collection.columns();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY row_order ASC;",
            column_list(columns),
            collection.name()
        ))?;

        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (index, column) in columns.iter().enumerate() {
                if let Some(value) = row.get::<_, Option<String>>(index)? {
                    record.set(*column, value);
                }
            }
            records.push(record);
        }

        debug!(
            "event=store_read module=repo backend=sqlite status=ok collection={} rows={}",
            collection,
            records.len()
        );
        Ok(records)
    }

    fn write_all(&self, collection: Collection, rows: &[Row]) -> StoreResult<()> {
        let mut conn = self.conn.lock().map_err(lock_poisoned)?;
        let columns = collection.columns();
        let dropped = rows
            .iter()
            .flat_map(|row| row.columns())
            .filter(|column| !columns.contains(column))
            .count();
        if dropped > 0 {
            warn!(
                "event=store_write module=repo backend=sqlite status=partial collection={} dropped_fields={}",
                collection, dropped
            );
        }

        let placeholders = vec!["?"; columns.len() + 1].join(", ");
        let insert_sql = format!(
            "INSERT INTO {} (row_order, {}) VALUES ({placeholders});",
            collection.name(),
            column_list(columns)
        );

        let tx = conn.transaction()?;
        tx.execute(&format!("DELETE FROM {};", collection.name()), [])?;
        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for (index, row) in rows.iter().enumerate() {
                let mut values = Vec::with_capacity(columns.len() + 1);
                values.push(Value::Integer(index as i64 + 1));
                for column in columns {
                    values.push(match row.get(column) {
                        Some(value) => Value::Text(value.to_string()),
                        None => Value::Null,
                    });
                }
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;

        debug!(
            "event=store_write module=repo backend=sqlite status=ok collection={} rows={}",
            collection,
            rows.len()
        );
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

fn column_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|column| format!("\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
