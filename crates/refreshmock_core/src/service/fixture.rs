//! Starter data for a fresh store.
//!
//! The fixture spans mid/late January 2024 so date windows such as
//! `[2024-01-20T00:00:00, 2024-01-25T23:59:59)` return a partial set.

use crate::model::record::{Collection, Row};
use crate::repo::record_store::{RecordStore, StoreResult};
use log::info;

const SEED_ISSUES: [[&str; 6]; 10] = [
    ["1", "2024-01-15T10:00:00", "", "Login page returns 500", "high", "open"],
    ["2", "2024-01-16T09:30:00", "", "Improve dashboard load time", "medium", "in_progress"],
    ["3", "2024-01-17T14:45:00", "", "Add CSV export", "low", "open"],
    ["4", "2024-01-18T08:15:00", "", "Typo on settings screen", "low", "closed"],
    ["5", "2024-01-19T16:20:00", "2024-01-21T11:00:00", "Duplicate of issue 1", "medium", "deleted"],
    ["6", "2024-01-20T12:00:00", "", "Session expires too early", "high", "open"],
    ["7", "2024-01-22T10:10:00", "", "Document refresh parameters", "medium", "in_progress"],
    ["8", "2024-01-23T17:40:00", "", "Timezone shown in report header", "low", "open"],
    ["9", "2024-01-24T09:05:00", "", "Retry failed sync jobs", "high", "in_progress"],
    ["10", "2024-01-25T15:30:00", "", "Add health endpoint checks", "medium", "closed"],
];

const SEED_PROJECTS: [[&str; 7]; 5] = [
    ["1", "2024-01-10T08:00:00", "", "Customer Portal", "Self-service customer portal", "active", "Joana Lima"],
    ["2", "2024-01-12T13:20:00", "", "Data Warehouse", "Central reporting warehouse", "active", "Pedro Alves"],
    ["3", "2024-01-15T09:00:00", "", "Mobile App", "Field team mobile app", "inactive", "Rita Sousa"],
    ["4", "2024-01-18T11:45:00", "", "Billing Revamp", "New invoicing flow", "active", "Bruno Dias"],
    ["5", "2024-01-21T16:00:00", "", "Internal Wiki", "Team knowledge base", "active", "Lucia Melo"],
];

/// Which collections a seed call wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    pub written: Vec<Collection>,
    pub skipped: Vec<Collection>,
}

/// Fixture rows for `collection`, in store order.
pub fn fixture_rows(collection: Collection) -> Vec<Row> {
    match collection {
        Collection::Issues => rows_from(collection, &SEED_ISSUES),
        Collection::Projects => rows_from(collection, &SEED_PROJECTS),
    }
}

fn rows_from<const N: usize>(collection: Collection, table: &[[&str; N]]) -> Vec<Row> {
    table
        .iter()
        .map(|values| {
            Row::from_pairs(
                collection
                    .columns()
                    .iter()
                    .copied()
                    .zip(values.iter().copied()),
            )
        })
        .collect()
}

/// Writes the fixture into every empty collection, or every collection when
/// `force` is set.
pub fn seed_store<S: RecordStore>(store: &S, force: bool) -> StoreResult<SeedOutcome> {
    let mut outcome = SeedOutcome::default();
    for collection in Collection::ALL {
        if !force && !store.read_all(collection)?.is_empty() {
            outcome.skipped.push(collection);
            continue;
        }
        store.write_all(collection, &fixture_rows(collection))?;
        outcome.written.push(collection);
    }

    info!(
        "event=seed_store module=service status=ok backend={} written={:?} skipped={:?}",
        store.backend(),
        outcome.written,
        outcome.skipped
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::{fixture_rows, seed_store};
    use crate::model::issue::Issue;
    use crate::model::project::Project;
    use crate::model::record::{Collection, CollectionRecord, Row};
    use crate::model::timestamp::is_well_formed;
    use crate::repo::memory_store::MemoryRecordStore;
    use crate::repo::record_store::RecordStore;

    #[test]
    fn fixture_rows_parse_as_typed_records() {
        for row in fixture_rows(Collection::Issues) {
            let issue = Issue::from_row(&row).unwrap();
            assert!(is_well_formed(&issue.updated_at));
        }
        for row in fixture_rows(Collection::Projects) {
            Project::from_row(&row).unwrap();
        }
    }

    #[test]
    fn seed_skips_non_empty_collections_unless_forced() {
        let existing = vec![Row::from_pairs([("id", "42")])];
        let store = MemoryRecordStore::with_rows(Collection::Issues, existing.clone());

        let outcome = seed_store(&store, false).unwrap();
        assert_eq!(outcome.skipped, vec![Collection::Issues]);
        assert_eq!(outcome.written, vec![Collection::Projects]);
        assert_eq!(store.read_all(Collection::Issues).unwrap(), existing);

        let outcome = seed_store(&store, true).unwrap();
        assert_eq!(outcome.written.len(), 2);
        assert_eq!(store.read_all(Collection::Issues).unwrap().len(), 10);
    }
}
