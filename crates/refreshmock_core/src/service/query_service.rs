//! Read-side use-case service for incremental-refresh polls.
//!
//! # Responsibility
//! - Read a full collection, apply the `updatedAt` window, normalize rows.
//! - Apply the configured read-failure policy at the service boundary.
//!
//! # Invariants
//! - Store order is preserved; no sort is applied.
//! - Soft-deleted rows are returned like any other row.
//! - Every canonical column is present in every returned row.
//! - The service never writes to the store.

use crate::model::record::{Collection, Row};
use crate::repo::record_store::{RecordStore, StoreError};
use crate::service::range::UpdatedAtRange;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// What `list` does when the store cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadFailurePolicy {
    /// Log the failure and answer with an empty list.
    #[default]
    FailSoft,
    /// Return the failure to the caller.
    Propagate,
}

#[derive(Debug)]
pub enum QueryError {
    Store {
        collection: Collection,
        source: StoreError,
    },
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store { collection, source } => {
                write!(f, "failed to read {collection}: {source}")
            }
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store { source, .. } => Some(source),
        }
    }
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Query service over an injected record store.
pub struct QueryService<S: RecordStore> {
    store: S,
    policy: ReadFailurePolicy,
}

impl<S: RecordStore> QueryService<S> {
    /// Creates a fail-soft service.
    pub fn new(store: S) -> Self {
        Self::with_policy(store, ReadFailurePolicy::FailSoft)
    }

    pub fn with_policy(store: S, policy: ReadFailurePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> ReadFailurePolicy {
        self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lists rows of `collection` whose `updatedAt` falls in `range`.
    ///
    /// # Contract
    /// - Under `FailSoft` this never returns `Err`.
    /// - Missing values are presented as `""`.
    pub fn list(&self, collection: Collection, range: &UpdatedAtRange) -> QueryResult<Vec<Row>> {
        let started_at = Instant::now();
        info!(
            "event=query_list module=service status=start collection={} min={:?} max={:?}",
            collection,
            range.min(),
            range.max()
        );

        let rows = match self.store.read_all(collection) {
            Ok(rows) => rows,
            Err(err) => return self.on_read_failure(collection, err, started_at),
        };

        let total = rows.len();
        let result: Vec<Row> = rows
            .iter()
            .filter(|row| range.matches(row))
            .map(|row| row.normalized(collection))
            .collect();

        info!(
            "event=query_list module=service status=ok collection={} backend={} total={} returned={} duration_ms={}",
            collection,
            self.store.backend(),
            total,
            result.len(),
            started_at.elapsed().as_millis()
        );
        Ok(result)
    }

    fn on_read_failure(
        &self,
        collection: Collection,
        err: StoreError,
        started_at: Instant,
    ) -> QueryResult<Vec<Row>> {
        match self.policy {
            ReadFailurePolicy::FailSoft => {
                error!(
                    "event=query_list module=service status=fallback collection={} backend={} duration_ms={} error={}",
                    collection,
                    self.store.backend(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Ok(Vec::new())
            }
            ReadFailurePolicy::Propagate => {
                error!(
                    "event=query_list module=service status=error collection={} backend={} duration_ms={} error={}",
                    collection,
                    self.store.backend(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(QueryError::Store {
                    collection,
                    source: err,
                })
            }
        }
    }
}
