//! Record store contract and error type.

use crate::db::DbError;
use crate::model::record::{Collection, RecordError, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage error shared by every backend.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Csv(csv::Error),
    Db(DbError),
    Record(RecordError),
    /// Backend state that cannot be mapped to rows.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Record(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Record(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for StoreError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RecordError> for StoreError {
    fn from(value: RecordError) -> Self {
        Self::Record(value)
    }
}

pub(crate) fn lock_poisoned<T>(_: std::sync::PoisonError<T>) -> StoreError {
    StoreError::InvalidData("store lock poisoned".to_string())
}

/// Whole-collection row store.
///
/// Implementations provide no isolation between a reader and a concurrent
/// `write_all`; callers accept torn reads.
pub trait RecordStore {
    /// Reads every row of `collection` in store order.
    fn read_all(&self, collection: Collection) -> StoreResult<Vec<Row>>;
    /// Replaces the full contents of `collection` with `rows`.
    fn write_all(&self, collection: Collection, rows: &[Row]) -> StoreResult<()>;
    /// Short backend name for diagnostics.
    fn backend(&self) -> &'static str;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn read_all(&self, collection: Collection) -> StoreResult<Vec<Row>> {
        (**self).read_all(collection)
    }

    fn write_all(&self, collection: Collection, rows: &[Row]) -> StoreResult<()> {
        (**self).write_all(collection, rows)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn read_all(&self, collection: Collection) -> StoreResult<Vec<Row>> {
        (**self).read_all(collection)
    }

    fn write_all(&self, collection: Collection, rows: &[Row]) -> StoreResult<()> {
        (**self).write_all(collection, rows)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

/// Thread-safe boxed store used by long-lived callers (HTTP server).
pub type SharedStore = Box<dyn RecordStore + Send + Sync>;
