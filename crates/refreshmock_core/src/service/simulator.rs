//! Data-mutation simulator run between incremental-refresh polls.
//!
//! # Responsibility
//! - Insert, field-update and soft-delete records so the next poll sees a delta.
//! - Stamp every mutation with the injected clock's time.
//!
//! # Invariants
//! - Each step is a read-modify-write of one collection and persists before
//!   the next step starts; there is no cross-step transaction.
//! - New ids continue contiguously from the collection's maximum id.
//! - Update and delete steps only ever select active (non-deleted) rows.
//! - Columns the typed records do not know about are carried through writes.

use crate::model::issue::{Issue, IssueStatus, Priority};
use crate::model::project::{Project, ProjectStatus};
use crate::model::record::{
    Collection, CollectionRecord, RecordError, Row, DELETED_AT_COLUMN, ID_COLUMN,
};
use crate::model::timestamp::format_timestamp;
use crate::repo::record_store::{RecordStore, StoreError};
use crate::service::clock::Clock;
use chrono::Duration;
use log::{error, info};
use rand::seq::index;
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const NEW_ISSUE_COUNT: usize = 5;
pub const ISSUE_UPDATE_SAMPLE: usize = 3;
pub const ISSUE_DELETE_SAMPLE: usize = 1;
pub const PROJECT_UPDATE_SAMPLE: usize = 2;
pub const UPDATED_SUFFIX: &str = "-UPDATED";

/// Inserted rows are backdated by a random whole number of hours in this range.
const BACKDATE_HOURS_MIN: i64 = 1;
const BACKDATE_HOURS_MAX: i64 = 24;

const ISSUE_TEXT_TEMPLATES: [&str; NEW_ISSUE_COUNT] = [
    "Critical bug",
    "Improvement",
    "Feature",
    "Documentation",
    "Test",
];

struct ProjectTemplate {
    name: &'static str,
    description: &'static str,
    owner: &'static str,
}

const NEW_PROJECTS: [ProjectTemplate; 3] = [
    ProjectTemplate {
        name: "Analytics System",
        description: "Advanced analytics dashboard",
        owner: "Ana Silva",
    },
    ProjectTemplate {
        name: "Financial Management App",
        description: "Personal finance control application",
        owner: "Carlos Santos",
    },
    ProjectTemplate {
        name: "Sales Portal",
        description: "Integrated sales portal",
        owner: "Maria Costa",
    },
];

#[derive(Debug)]
pub enum SimulationError {
    Store {
        collection: Collection,
        source: StoreError,
    },
    Record(RecordError),
    InvalidId {
        collection: Collection,
        value: String,
    },
    /// The next id would not fit in `u64`.
    IdExhausted {
        collection: Collection,
    },
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store { collection, source } => write!(f, "store failure on {collection}: {source}"),
            Self::Record(err) => write!(f, "{err}"),
            Self::InvalidId { collection, value } => {
                write!(f, "non-integer id `{value}` in {collection}.id")
            }
            Self::IdExhausted { collection } => {
                write!(f, "no ids left above the maximum in {collection}")
            }
        }
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store { source, .. } => Some(source),
            Self::Record(err) => Some(err),
            Self::InvalidId { .. } | Self::IdExhausted { .. } => None,
        }
    }
}

impl From<RecordError> for SimulationError {
    fn from(value: RecordError) -> Self {
        Self::Record(value)
    }
}

pub type SimulationResult<T> = Result<T, SimulationError>;

/// Ids touched by one simulator run, per step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub inserted_issues: Vec<String>,
    pub updated_issues: Vec<String>,
    pub deleted_issues: Vec<String>,
    pub inserted_projects: Vec<String>,
    pub updated_projects: Vec<String>,
}

impl Display for SimulationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "simulation run {}", self.run_id)?;
        write_line(f, "issues inserted", &self.inserted_issues)?;
        write_line(f, "issues updated", &self.updated_issues)?;
        write_line(f, "issues deleted", &self.deleted_issues)?;
        write_line(f, "projects inserted", &self.inserted_projects)?;
        write_line(f, "projects updated", &self.updated_projects)
    }
}

fn write_line(f: &mut Formatter<'_>, label: &str, ids: &[String]) -> std::fmt::Result {
    writeln!(f, "  {label}: {} [{}]", ids.len(), ids.join(", "))
}

/// Batch mutator over an injected store, clock and randomness source.
pub struct MutationSimulator<S: RecordStore, C: Clock, R: Rng> {
    store: S,
    clock: C,
    rng: R,
}

impl<S: RecordStore, C: Clock, R: Rng> MutationSimulator<S, C, R> {
    pub fn new(store: S, clock: C, rng: R) -> Self {
        Self { store, clock, rng }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs all five steps in order.
    ///
    /// A failing step aborts the run; earlier steps stay persisted.
    pub fn run(&mut self) -> SimulationResult<SimulationReport> {
        let run_id = Uuid::new_v4();
        info!(
            "event=simulate_run module=simulator status=start run_id={} backend={}",
            run_id,
            self.store.backend()
        );

        let result = self.run_steps(run_id);
        match &result {
            Ok(report) => info!(
                "event=simulate_run module=simulator status=ok run_id={} issues_inserted={} issues_updated={} issues_deleted={} projects_inserted={} projects_updated={}",
                run_id,
                report.inserted_issues.len(),
                report.updated_issues.len(),
                report.deleted_issues.len(),
                report.inserted_projects.len(),
                report.updated_projects.len()
            ),
            Err(err) => error!(
                "event=simulate_run module=simulator status=error run_id={} error={}",
                run_id, err
            ),
        }
        result
    }

    fn run_steps(&mut self, run_id: Uuid) -> SimulationResult<SimulationReport> {
        Ok(SimulationReport {
            run_id,
            inserted_issues: self.insert_issues()?,
            updated_issues: self.update_issues()?,
            deleted_issues: self.soft_delete_issues()?,
            inserted_projects: self.insert_projects()?,
            updated_projects: self.update_projects()?,
        })
    }

    /// Appends five new issues with backdated stamps. Returns the new ids.
    pub fn insert_issues(&mut self) -> SimulationResult<Vec<String>> {
        let collection = Collection::Issues;
        let mut rows = self.read(collection)?;
        let ids = next_ids(collection, &rows, NEW_ISSUE_COUNT)?;

        let mut inserted = Vec::with_capacity(NEW_ISSUE_COUNT);
        for (id, template) in ids.into_iter().zip(ISSUE_TEXT_TEMPLATES) {
            let issue = Issue {
                id: id.clone(),
                updated_at: self.backdated_stamp(),
                deleted_at: String::new(),
                text: format!("New issue {id} - {template}"),
                priority: Priority::ALL[self.rng.gen_range(0..Priority::ALL.len())],
                status: self.pick_issue_status(),
            };
            rows.push(issue.to_row());
            inserted.push(id);
        }

        self.write(collection, &rows)?;
        log_step("insert_issues", collection, &inserted);
        Ok(inserted)
    }

    /// Stamps up to three random active issues and edits status or text.
    pub fn update_issues(&mut self) -> SimulationResult<Vec<String>> {
        let collection = Collection::Issues;
        let mut rows = self.read(collection)?;
        let now = self.now_stamp();

        let mut updated = Vec::new();
        for row_index in self.sample_active(&rows, ISSUE_UPDATE_SAMPLE) {
            let row = &mut rows[row_index];
            let mut issue = Issue::from_row(row)?;
            issue.touch(&now);
            if self.rng.gen_bool(0.5) {
                issue.status = self.pick_issue_status();
            } else {
                issue.text.push_str(UPDATED_SUFFIX);
            }
            merge_into(row, &issue);
            updated.push(issue.id);
        }

        if !updated.is_empty() {
            self.write(collection, &rows)?;
        }
        log_step("update_issues", collection, &updated);
        Ok(updated)
    }

    /// Soft-deletes one random active issue.
    pub fn soft_delete_issues(&mut self) -> SimulationResult<Vec<String>> {
        let collection = Collection::Issues;
        let mut rows = self.read(collection)?;
        let now = self.now_stamp();

        let mut deleted = Vec::new();
        for row_index in self.sample_active(&rows, ISSUE_DELETE_SAMPLE) {
            let row = &mut rows[row_index];
            let mut issue = Issue::from_row(row)?;
            issue.soft_delete(&now);
            merge_into(row, &issue);
            deleted.push(issue.id);
        }

        if !deleted.is_empty() {
            self.write(collection, &rows)?;
        }
        log_step("soft_delete_issues", collection, &deleted);
        Ok(deleted)
    }

    /// Appends the three fixed projects as `active`. Returns the new ids.
    pub fn insert_projects(&mut self) -> SimulationResult<Vec<String>> {
        let collection = Collection::Projects;
        let mut rows = self.read(collection)?;
        let ids = next_ids(collection, &rows, NEW_PROJECTS.len())?;

        let mut inserted = Vec::with_capacity(NEW_PROJECTS.len());
        for (id, template) in ids.into_iter().zip(NEW_PROJECTS.iter()) {
            let project = Project {
                id: id.clone(),
                updated_at: self.backdated_stamp(),
                deleted_at: String::new(),
                name: template.name.to_string(),
                description: template.description.to_string(),
                status: ProjectStatus::Active,
                owner: template.owner.to_string(),
            };
            rows.push(project.to_row());
            inserted.push(id);
        }

        self.write(collection, &rows)?;
        log_step("insert_projects", collection, &inserted);
        Ok(inserted)
    }

    /// Stamps up to two random active projects and edits status or description.
    pub fn update_projects(&mut self) -> SimulationResult<Vec<String>> {
        let collection = Collection::Projects;
        let mut rows = self.read(collection)?;
        let now = self.now_stamp();

        let mut updated = Vec::new();
        for row_index in self.sample_active(&rows, PROJECT_UPDATE_SAMPLE) {
            let row = &mut rows[row_index];
            let mut project = Project::from_row(row)?;
            project.touch(&now);
            if self.rng.gen_bool(0.5) {
                let choices = ProjectStatus::ASSIGNABLE;
                project.status = choices[self.rng.gen_range(0..choices.len())];
            } else {
                project.description.push_str(UPDATED_SUFFIX);
            }
            merge_into(row, &project);
            updated.push(project.id);
        }

        if !updated.is_empty() {
            self.write(collection, &rows)?;
        }
        log_step("update_projects", collection, &updated);
        Ok(updated)
    }

    fn read(&self, collection: Collection) -> SimulationResult<Vec<Row>> {
        self.store
            .read_all(collection)
            .map_err(|source| SimulationError::Store { collection, source })
    }

    fn write(&self, collection: Collection, rows: &[Row]) -> SimulationResult<()> {
        self.store
            .write_all(collection, rows)
            .map_err(|source| SimulationError::Store { collection, source })
    }

    fn now_stamp(&self) -> String {
        format_timestamp(self.clock.now())
    }

    fn backdated_stamp(&mut self) -> String {
        let hours_ago = self.rng.gen_range(BACKDATE_HOURS_MIN..=BACKDATE_HOURS_MAX);
        format_timestamp(self.clock.now() - Duration::hours(hours_ago))
    }

    fn pick_issue_status(&mut self) -> IssueStatus {
        let choices = IssueStatus::ASSIGNABLE;
        choices[self.rng.gen_range(0..choices.len())]
    }

    /// Samples up to `amount` indices of active rows without replacement.
    fn sample_active(&mut self, rows: &[Row], amount: usize) -> Vec<usize> {
        let active: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| is_active_row(row))
            .map(|(row_index, _)| row_index)
            .collect();
        let amount = amount.min(active.len());
        if amount == 0 {
            return Vec::new();
        }
        index::sample(&mut self.rng, active.len(), amount)
            .into_iter()
            .map(|picked| active[picked])
            .collect()
    }
}

fn is_active_row(row: &Row) -> bool {
    row.get(DELETED_AT_COLUMN).unwrap_or("").is_empty()
}

/// Highest integer id plus one; `1` for an empty collection.
fn next_id(collection: Collection, rows: &[Row]) -> SimulationResult<u64> {
    let mut max_id = 0;
    for row in rows {
        let value = row.get(ID_COLUMN).unwrap_or("");
        let id = value
            .trim()
            .parse::<u64>()
            .map_err(|_| SimulationError::InvalidId {
                collection,
                value: value.to_string(),
            })?;
        max_id = max_id.max(id);
    }
    max_id
        .checked_add(1)
        .ok_or(SimulationError::IdExhausted { collection })
}

/// `count` contiguous ids starting at `next_id`.
fn next_ids(collection: Collection, rows: &[Row], count: usize) -> SimulationResult<Vec<String>> {
    let first = next_id(collection, rows)?;
    (0..count as u64)
        .map(|offset| {
            first
                .checked_add(offset)
                .map(|id| id.to_string())
                .ok_or(SimulationError::IdExhausted { collection })
        })
        .collect()
}

fn merge_into<T: CollectionRecord>(row: &mut Row, record: &T) {
    for (column, value) in record.to_row().iter() {
        row.set(column, value);
    }
}

fn log_step(step: &str, collection: Collection, ids: &[String]) {
    info!(
        "event=simulate_step module=simulator status=ok step={} collection={} count={} ids={}",
        step,
        collection,
        ids.len(),
        ids.join(",")
    );
}
