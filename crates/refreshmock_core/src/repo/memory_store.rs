//! In-process record store for tests and dry runs.

use crate::model::record::{Collection, Row};
use crate::repo::record_store::{lock_poisoned, RecordStore, StoreResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Memory-backed record store. Unknown collections read as empty.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    collections: Mutex<HashMap<Collection, Vec<Row>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with `rows` for `collection`.
    pub fn with_rows(collection: Collection, rows: Vec<Row>) -> Self {
        let store = Self::new();
        store
            .collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(collection, rows);
        store
    }
}

impl RecordStore for MemoryRecordStore {
    fn read_all(&self, collection: Collection) -> StoreResult<Vec<Row>> {
        let collections = self.collections.lock().map_err(lock_poisoned)?;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    fn write_all(&self, collection: Collection, rows: &[Row]) -> StoreResult<()> {
        let mut collections = self.collections.lock().map_err(lock_poisoned)?;
        collections.insert(collection, rows.to_vec());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
