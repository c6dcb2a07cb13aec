//! Core logic for the incremental-refresh mock data service.
//! This crate owns the record model, the store backends, the half-open
//! `updatedAt` query path and the mutation simulator.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{open_store, AppConfig, ConfigError, StoreBackend};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::issue::{Issue, IssueStatus, Priority};
pub use model::project::{Project, ProjectStatus};
pub use model::record::{Collection, CollectionRecord, RecordError, Row};
pub use model::timestamp::{format_timestamp, is_well_formed, TIMESTAMP_FORMAT};
pub use repo::csv_store::CsvRecordStore;
pub use repo::memory_store::MemoryRecordStore;
pub use repo::record_store::{RecordStore, SharedStore, StoreError, StoreResult};
pub use repo::sqlite_store::SqliteRecordStore;
pub use service::clock::{Clock, FixedClock, SystemClock};
pub use service::fixture::{fixture_rows, seed_store, SeedOutcome};
pub use service::query_service::{QueryError, QueryResult, QueryService, ReadFailurePolicy};
pub use service::range::UpdatedAtRange;
pub use service::simulator::{
    MutationSimulator, SimulationError, SimulationReport, SimulationResult, UPDATED_SUFFIX,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
