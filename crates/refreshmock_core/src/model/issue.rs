//! Issue record model.
//!
//! # Responsibility
//! - Define the typed issue record and its enum fields.
//! - Provide lifecycle helpers for touch/soft-delete semantics.
//!
//! # Invariants
//! - `deleted_at` empty means active; non-empty means tombstoned.
//! - A tombstoned issue always has `status == IssueStatus::Deleted`.

use crate::model::record::{
    optional_field, required_field, Collection, CollectionRecord, RecordError, Row,
    DELETED_AT_COLUMN, ID_COLUMN, UPDATED_AT_COLUMN,
};
use crate::model::timestamp::latest_of;

/// Issue priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Issue lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStatus {
    Open,
    InProgress,
    Closed,
    /// Terminal tombstone marker set by soft delete.
    Deleted,
}

impl IssueStatus {
    /// States an active issue may be assigned.
    pub const ASSIGNABLE: [IssueStatus; 3] =
        [IssueStatus::Open, IssueStatus::InProgress, IssueStatus::Closed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "in_progress" => Some(Self::InProgress),
            "closed" => Some(Self::Closed),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// Typed issue record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub id: String,
    pub updated_at: String,
    /// Empty when the issue is active.
    pub deleted_at: String,
    pub text: String,
    pub priority: Priority,
    pub status: IssueStatus,
}

impl Issue {
    /// Stamps a mutation at `now`; the stored stamp never moves backwards.
    pub fn touch(&mut self, now: &str) {
        self.updated_at = latest_of(&self.updated_at, now).to_string();
    }

    /// Tombstones this issue at `now`.
    pub fn soft_delete(&mut self, now: &str) {
        self.touch(now);
        self.deleted_at = now.to_string();
        self.status = IssueStatus::Deleted;
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_empty()
    }
}

impl CollectionRecord for Issue {
    const COLLECTION: Collection = Collection::Issues;

    fn from_row(row: &Row) -> Result<Self, RecordError> {
        let collection = Self::COLLECTION;
        let priority_text = required_field(row, collection, "priority")?;
        let priority = Priority::parse(priority_text).ok_or_else(|| RecordError::InvalidField {
            collection,
            field: "priority",
            value: priority_text.to_string(),
        })?;
        let status_text = required_field(row, collection, "status")?;
        let status = IssueStatus::parse(status_text).ok_or_else(|| RecordError::InvalidField {
            collection,
            field: "status",
            value: status_text.to_string(),
        })?;

        Ok(Self {
            id: required_field(row, collection, ID_COLUMN)?.to_string(),
            updated_at: required_field(row, collection, UPDATED_AT_COLUMN)?.to_string(),
            deleted_at: optional_field(row, DELETED_AT_COLUMN),
            text: optional_field(row, "text"),
            priority,
            status,
        })
    }

    fn to_row(&self) -> Row {
        Row::from_pairs([
            (ID_COLUMN, self.id.as_str()),
            (UPDATED_AT_COLUMN, self.updated_at.as_str()),
            (DELETED_AT_COLUMN, self.deleted_at.as_str()),
            ("text", self.text.as_str()),
            ("priority", self.priority.as_str()),
            ("status", self.status.as_str()),
        ])
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_deleted(&self) -> bool {
        !self.is_active()
    }
}
