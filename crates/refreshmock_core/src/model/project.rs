//! Project record model.

use crate::model::record::{
    optional_field, required_field, Collection, CollectionRecord, RecordError, Row,
    DELETED_AT_COLUMN, ID_COLUMN, UPDATED_AT_COLUMN,
};
use crate::model::timestamp::latest_of;

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Active,
    Inactive,
    /// Terminal tombstone marker for soft-deleted projects.
    Deleted,
}

impl ProjectStatus {
    pub const ASSIGNABLE: [ProjectStatus; 2] = [ProjectStatus::Active, ProjectStatus::Inactive];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// Typed project record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub updated_at: String,
    pub deleted_at: String,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub owner: String,
}

impl Project {
    /// Stamps a mutation at `now`; the stored stamp never moves backwards.
    pub fn touch(&mut self, now: &str) {
        self.updated_at = latest_of(&self.updated_at, now).to_string();
    }

    pub fn soft_delete(&mut self, now: &str) {
        self.touch(now);
        self.deleted_at = now.to_string();
        self.status = ProjectStatus::Deleted;
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_empty()
    }
}

impl CollectionRecord for Project {
    const COLLECTION: Collection = Collection::Projects;

    fn from_row(row: &Row) -> Result<Self, RecordError> {
        let collection = Self::COLLECTION;
        let status_text = required_field(row, collection, "status")?;
        let status =
            ProjectStatus::parse(status_text).ok_or_else(|| RecordError::InvalidField {
                collection,
                field: "status",
                value: status_text.to_string(),
            })?;

        Ok(Self {
            id: required_field(row, collection, ID_COLUMN)?.to_string(),
            updated_at: required_field(row, collection, UPDATED_AT_COLUMN)?.to_string(),
            deleted_at: optional_field(row, DELETED_AT_COLUMN),
            name: optional_field(row, "name"),
            description: optional_field(row, "description"),
            status,
            owner: optional_field(row, "owner"),
        })
    }

    fn to_row(&self) -> Row {
        Row::from_pairs([
            (ID_COLUMN, self.id.as_str()),
            (UPDATED_AT_COLUMN, self.updated_at.as_str()),
            (DELETED_AT_COLUMN, self.deleted_at.as_str()),
            ("name", self.name.as_str()),
            ("description", self.description.as_str()),
            ("status", self.status.as_str()),
            ("owner", self.owner.as_str()),
        ])
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_deleted(&self) -> bool {
        !self.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::{Project, ProjectStatus};
    use crate::model::record::{Collection, CollectionRecord};

    #[test]
    fn to_row_uses_canonical_column_order() {
        let project = Project {
            id: "1".to_string(),
            updated_at: "2024-01-10T08:00:00".to_string(),
            deleted_at: String::new(),
            name: "Portal".to_string(),
            description: "Sales portal".to_string(),
            status: ProjectStatus::Active,
            owner: "Maria Costa".to_string(),
        };
        let row = project.to_row();
        assert_eq!(
            row.columns().collect::<Vec<_>>(),
            Collection::Projects.columns().to_vec()
        );
        assert_eq!(Project::from_row(&row).unwrap(), project);
    }

    #[test]
    fn touch_keeps_later_stored_stamp() {
        let mut project = Project {
            id: "1".to_string(),
            updated_at: "2030-01-01T00:00:00".to_string(),
            deleted_at: String::new(),
            name: String::new(),
            description: String::new(),
            status: ProjectStatus::Inactive,
            owner: String::new(),
        };
        project.touch("2024-01-01T00:00:00");
        assert_eq!(project.updated_at, "2030-01-01T00:00:00");
    }
}
