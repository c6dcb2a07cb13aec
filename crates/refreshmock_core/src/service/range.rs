//! Half-open `updatedAt` range used by incremental-refresh polls.
//!
//! # Invariants
//! - Lower bound inclusive, upper bound exclusive.
//! - Bounds compare as plain strings against the stored `updatedAt`.
//! - An empty bound is treated the same as an absent one.

use crate::model::record::Row;
use crate::model::timestamp::is_well_formed;
use log::warn;

/// Optional `[min, max)` window on `updatedAt`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatedAtRange {
    min: Option<String>,
    max: Option<String>,
}

impl UpdatedAtRange {
    /// Range with no bounds; matches every row.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Builds a range from raw query-string values.
    ///
    /// Empty strings collapse to `None`. Values outside the stored timestamp
    /// shape are kept as given and logged, since they still order lexically.
    pub fn new(min: Option<&str>, max: Option<&str>) -> Self {
        Self {
            min: normalize_bound("updatedAt_min", min),
            max: normalize_bound("updatedAt_max", max),
        }
    }

    pub fn min(&self) -> Option<&str> {
        self.min.as_deref()
    }

    pub fn max(&self) -> Option<&str> {
        self.max.as_deref()
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Returns whether a stored `updatedAt` value falls inside the window.
    pub fn contains(&self, updated_at: &str) -> bool {
        let above_min = self.min.as_deref().map_or(true, |min| updated_at >= min);
        let below_max = self.max.as_deref().map_or(true, |max| updated_at < max);
        above_min && below_max
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.contains(row.updated_at())
    }
}

fn normalize_bound(name: &str, value: Option<&str>) -> Option<String> {
    let value = value?;
    if value.is_empty() {
        return None;
    }
    if !is_well_formed(value) {
        warn!("event=range_bound module=service status=malformed bound={name} value={value:?}");
    }
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::UpdatedAtRange;

    const AT: &str = "2024-01-15T10:00:00";

    #[test]
    fn lower_bound_is_inclusive() {
        assert!(UpdatedAtRange::new(Some(AT), None).contains(AT));
        assert!(!UpdatedAtRange::new(Some("2024-01-15T10:00:01"), None).contains(AT));
    }

    #[test]
    fn upper_bound_is_exclusive() {
        assert!(!UpdatedAtRange::new(None, Some(AT)).contains(AT));
        assert!(UpdatedAtRange::new(None, Some("2024-01-15T10:00:01")).contains(AT));
    }

    #[test]
    fn empty_bounds_are_absent() {
        let range = UpdatedAtRange::new(Some(""), Some(""));
        assert!(range.is_unbounded());
        assert!(range.contains(""));
    }

    #[test]
    fn equal_bounds_match_nothing() {
        let range = UpdatedAtRange::new(Some(AT), Some(AT));
        assert!(!range.contains(AT));
    }

    #[test]
    fn malformed_bound_still_compares_lexically() {
        let range = UpdatedAtRange::new(Some("2024"), None);
        assert_eq!(range.min(), Some("2024"));
        assert!(range.contains(AT));
        assert!(!range.contains("2023-12-31T23:59:59"));
    }
}
