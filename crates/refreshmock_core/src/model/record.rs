//! Flat text rows and collection metadata.
//!
//! # Responsibility
//! - Represent one stored record as ordered `column -> text` pairs.
//! - Name the two collections and their canonical column sets.
//! - Normalize missing values to empty strings for presentation.
//!
//! # Invariants
//! - A `Row` never holds two values for the same column.
//! - Column order is the order columns were first set (store order).

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const ID_COLUMN: &str = "id";
pub const UPDATED_AT_COLUMN: &str = "updatedAt";
pub const DELETED_AT_COLUMN: &str = "deletedAt";

const ISSUE_COLUMNS: &[&str] = &[
    ID_COLUMN,
    UPDATED_AT_COLUMN,
    DELETED_AT_COLUMN,
    "text",
    "priority",
    "status",
];

const PROJECT_COLUMNS: &[&str] = &[
    ID_COLUMN,
    UPDATED_AT_COLUMN,
    DELETED_AT_COLUMN,
    "name",
    "description",
    "status",
    "owner",
];

/// Named record collection served by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Issues,
    Projects,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Issues, Collection::Projects];

    /// Stable collection name, used for table names and URL paths.
    pub fn name(self) -> &'static str {
        match self {
            Self::Issues => "issues",
            Self::Projects => "projects",
        }
    }

    /// Canonical column set in presentation order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Issues => ISSUE_COLUMNS,
            Self::Projects => PROJECT_COLUMNS,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "issues" => Some(Self::Issues),
            "projects" => Some(Self::Projects),
            _ => None,
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error raised when a row cannot be converted into a typed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    MissingField {
        collection: Collection,
        field: &'static str,
    },
    InvalidField {
        collection: Collection,
        field: &'static str,
        value: String,
    },
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { collection, field } => {
                write!(f, "{collection}.{field} is missing")
            }
            Self::InvalidField {
                collection,
                field,
                value,
            } => write!(f, "invalid value `{value}` in {collection}.{field}"),
        }
    }
}

impl Error for RecordError {}

/// One stored record: ordered text values keyed by column name.
///
/// Absent columns model both "missing" and "null"; callers that present rows
/// use [`Row::normalized`] so the two are indistinguishable from `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut row = Self::new();
        for (column, value) in pairs {
            row.set(column, value);
        }
        row
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Sets `column`, replacing an existing value in place.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn remove(&mut self, column: &str) -> Option<String> {
        let index = self.fields.iter().position(|(name, _)| name == column)?;
        Some(self.fields.remove(index).1)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Last-modified stamp, `""` when absent.
    pub fn updated_at(&self) -> &str {
        self.get(UPDATED_AT_COLUMN).unwrap_or("")
    }

    /// Returns a copy with every canonical column of `collection` present.
    ///
    /// Canonical columns come first in schema order, filled with `""` when
    /// missing; extra columns follow in their stored order.
    pub fn normalized(&self, collection: Collection) -> Row {
        let schema = collection.columns();
        let mut row = Row::new();
        for column in schema {
            row.set(*column, self.get(column).unwrap_or(""));
        }
        for (column, value) in self.iter() {
            if !schema.contains(&column) {
                row.set(column, value);
            }
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Typed view over a row of one collection.
pub trait CollectionRecord: Sized {
    const COLLECTION: Collection;

    fn from_row(row: &Row) -> Result<Self, RecordError>;
    fn to_row(&self) -> Row;
    fn id(&self) -> &str;
    fn is_deleted(&self) -> bool;
}

pub(crate) fn required_field<'a>(
    row: &'a Row,
    collection: Collection,
    field: &'static str,
) -> Result<&'a str, RecordError> {
    match row.get(field) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(RecordError::MissingField { collection, field }),
    }
}

pub(crate) fn optional_field(row: &Row, field: &str) -> String {
    row.get(field).unwrap_or("").to_string()
}
