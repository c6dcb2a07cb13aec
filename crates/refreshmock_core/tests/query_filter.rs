use refreshmock_core::{
    Collection, CsvRecordStore, MemoryRecordStore, QueryError, QueryService, ReadFailurePolicy,
    RecordStore, Row, StoreError, StoreResult, UpdatedAtRange,
};
use std::fs;

fn issue(id: &str, updated_at: &str, deleted_at: &str) -> Row {
    Row::from_pairs([
        ("id", id),
        ("updatedAt", updated_at),
        ("deletedAt", deleted_at),
        ("text", "body"),
        ("priority", "low"),
        ("status", if deleted_at.is_empty() { "open" } else { "deleted" }),
    ])
}

fn ids(rows: &[Row]) -> Vec<&str> {
    rows.iter().map(|row| row.get("id").unwrap()).collect()
}

fn single_issue_service() -> QueryService<MemoryRecordStore> {
    QueryService::new(MemoryRecordStore::with_rows(
        Collection::Issues,
        vec![issue("1", "2024-01-15T10:00:00", "")],
    ))
}

struct BrokenStore;

impl RecordStore for BrokenStore {
    fn read_all(&self, _collection: Collection) -> StoreResult<Vec<Row>> {
        Err(StoreError::InvalidData("corrupt row".to_string()))
    }

    fn write_all(&self, _collection: Collection, _rows: &[Row]) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "broken"
    }
}

#[test]
fn lower_bound_equal_to_updated_at_is_included() {
    let service = single_issue_service();
    let rows = service
        .list(
            Collection::Issues,
            &UpdatedAtRange::new(Some("2024-01-15T10:00:00"), None),
        )
        .unwrap();
    assert_eq!(ids(&rows), vec!["1"]);
}

#[test]
fn upper_bound_equal_to_updated_at_is_excluded() {
    let service = single_issue_service();
    let rows = service
        .list(
            Collection::Issues,
            &UpdatedAtRange::new(None, Some("2024-01-15T10:00:00")),
        )
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn lower_bound_one_second_later_excludes_record() {
    let service = single_issue_service();
    let rows = service
        .list(
            Collection::Issues,
            &UpdatedAtRange::new(Some("2024-01-15T10:00:01"), None),
        )
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn consecutive_windows_partition_records_without_overlap() {
    let store = MemoryRecordStore::with_rows(
        Collection::Issues,
        vec![
            issue("1", "2024-01-15T09:59:59", ""),
            issue("2", "2024-01-15T10:00:00", ""),
            issue("3", "2024-01-15T10:30:00", ""),
            issue("4", "2024-01-15T11:00:00", ""),
        ],
    );
    let service = QueryService::new(store);

    let first = service
        .list(
            Collection::Issues,
            &UpdatedAtRange::new(Some("2024-01-15T09:00:00"), Some("2024-01-15T10:00:00")),
        )
        .unwrap();
    let second = service
        .list(
            Collection::Issues,
            &UpdatedAtRange::new(Some("2024-01-15T10:00:00"), Some("2024-01-15T11:00:00")),
        )
        .unwrap();

    assert_eq!(ids(&first), vec!["1"]);
    assert_eq!(ids(&second), vec!["2", "3"]);
}

#[test]
fn unfiltered_query_returns_soft_deleted_rows_in_store_order() {
    let store = MemoryRecordStore::with_rows(
        Collection::Issues,
        vec![
            issue("3", "2024-01-17T00:00:00", ""),
            issue("1", "2024-01-20T00:00:00", "2024-01-20T00:00:00"),
            issue("2", "2024-01-16T00:00:00", ""),
        ],
    );
    let service = QueryService::new(store);

    let rows = service
        .list(Collection::Issues, &UpdatedAtRange::unbounded())
        .unwrap();
    assert_eq!(ids(&rows), vec!["3", "1", "2"]);
    assert_eq!(rows[1].get("status"), Some("deleted"));
    assert_eq!(rows[1].get("deletedAt"), Some("2024-01-20T00:00:00"));
}

#[test]
fn soft_deleted_row_in_range_is_returned() {
    let store = MemoryRecordStore::with_rows(
        Collection::Issues,
        vec![issue("5", "2024-01-21T11:00:00", "2024-01-21T11:00:00")],
    );
    let service = QueryService::new(store);

    let rows = service
        .list(
            Collection::Issues,
            &UpdatedAtRange::new(Some("2024-01-21T00:00:00"), Some("2024-01-22T00:00:00")),
        )
        .unwrap();
    assert_eq!(ids(&rows), vec!["5"]);
}

#[test]
fn missing_fields_are_presented_as_empty_strings() {
    let store = MemoryRecordStore::with_rows(
        Collection::Projects,
        vec![Row::from_pairs([("id", "1"), ("updatedAt", "2024-01-10T08:00:00")])],
    );
    let service = QueryService::new(store);

    let rows = service
        .list(Collection::Projects, &UpdatedAtRange::unbounded())
        .unwrap();
    let json = serde_json::to_value(&rows).unwrap();
    let object = json[0].as_object().unwrap();

    assert_eq!(object.len(), Collection::Projects.columns().len());
    for column in Collection::Projects.columns() {
        assert!(object[*column].is_string(), "{column} should be a string");
    }
    assert_eq!(object["id"], "1");
    assert_eq!(object["owner"], "");
    assert_eq!(object["deletedAt"], "");
}

#[test]
fn rows_without_updated_at_only_match_unbounded_queries() {
    let store = MemoryRecordStore::with_rows(
        Collection::Issues,
        vec![Row::from_pairs([("id", "1")])],
    );
    let service = QueryService::new(store);

    let all = service
        .list(Collection::Issues, &UpdatedAtRange::unbounded())
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].get("updatedAt"), Some(""));

    let bounded = service
        .list(
            Collection::Issues,
            &UpdatedAtRange::new(Some("2024-01-01T00:00:00"), None),
        )
        .unwrap();
    assert!(bounded.is_empty());
}

#[test]
fn repeated_queries_are_idempotent() {
    let service = single_issue_service();
    let range = UpdatedAtRange::new(Some("2024-01-01T00:00:00"), Some("2024-02-01T00:00:00"));
    let first = service.list(Collection::Issues, &range).unwrap();
    let second = service.list(Collection::Issues, &range).unwrap();
    assert_eq!(first, second);
}

#[test]
fn fail_soft_maps_store_failure_to_empty_list() {
    let service = QueryService::new(BrokenStore);
    let rows = service
        .list(Collection::Issues, &UpdatedAtRange::unbounded())
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn propagate_policy_returns_store_failure() {
    let service = QueryService::with_policy(BrokenStore, ReadFailurePolicy::Propagate);
    let err = service
        .list(Collection::Projects, &UpdatedAtRange::unbounded())
        .unwrap_err();
    match err {
        QueryError::Store { collection, .. } => assert_eq!(collection, Collection::Projects),
    }
}

#[test]
fn csv_store_scenario_matches_half_open_semantics() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("issues.csv"),
        "id,updatedAt,deletedAt,text,priority,status\n1,2024-01-15T10:00:00,,seed,high,open\n",
    )
    .unwrap();
    let service = QueryService::new(CsvRecordStore::new(dir.path()));

    let included = service
        .list(
            Collection::Issues,
            &UpdatedAtRange::new(Some("2024-01-15T10:00:00"), None),
        )
        .unwrap();
    assert_eq!(ids(&included), vec!["1"]);
    assert_eq!(included[0].get("deletedAt"), Some(""));

    let excluded = service
        .list(
            Collection::Issues,
            &UpdatedAtRange::new(None, Some("2024-01-15T10:00:00")),
        )
        .unwrap();
    assert!(excluded.is_empty());
}

#[test]
fn corrupt_csv_file_fails_soft() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("projects.csv"),
        "id,updatedAt\n1,2024-01-10T08:00:00,unexpected,extra\n",
    )
    .unwrap();
    let service = QueryService::new(CsvRecordStore::new(dir.path()));

    let rows = service
        .list(Collection::Projects, &UpdatedAtRange::unbounded())
        .unwrap();
    assert!(rows.is_empty());
}
