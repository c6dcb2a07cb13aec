//! Timestamp format shared by `updatedAt` and `deletedAt`.
//!
//! # Invariants
//! - Every timestamp written by this crate goes through [`format_timestamp`],
//!   so stored values are zero-padded `YYYY-MM-DDTHH:MM:SS` with second
//!   precision and no zone suffix.
//! - Range filtering compares timestamps as plain strings, which orders them
//!   chronologically only while the invariant above holds.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}$").expect("valid timestamp regex")
});

/// Formats a wall-clock time in the stored timestamp format.
///
/// Sub-second precision is truncated.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Returns whether `value` has the exact stored timestamp shape.
///
/// Shape only: `2024-13-45T99:00:00` is well-formed here even though it is
/// not a real date, since comparison never parses it.
pub fn is_well_formed(value: &str) -> bool {
    TIMESTAMP_RE.is_match(value)
}

/// Returns the later of two stored timestamps.
///
/// Falls back to `candidate` when `current` is not well-formed, so a corrupt
/// stamp is always overwritten.
pub fn latest_of<'a>(current: &'a str, candidate: &'a str) -> &'a str {
    if is_well_formed(current) && current > candidate {
        current
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, is_well_formed, latest_of};
    use chrono::NaiveDate;

    #[test]
    fn format_is_zero_padded_and_truncates_subseconds() {
        let value = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_milli_opt(7, 3, 9, 987)
            .unwrap();
        assert_eq!(format_timestamp(value), "2024-01-05T07:03:09");
    }

    #[test]
    fn well_formed_rejects_other_iso_variants() {
        assert!(is_well_formed("2024-01-15T10:00:00"));
        assert!(!is_well_formed("2024-01-15 10:00:00"));
        assert!(!is_well_formed("2024-01-15T10:00:00Z"));
        assert!(!is_well_formed("2024-01-15T10:00:00.123"));
        assert!(!is_well_formed("2024-1-15T10:00:00"));
        assert!(!is_well_formed(""));
    }

    #[test]
    fn latest_of_never_moves_backwards() {
        assert_eq!(
            latest_of("2024-02-01T00:00:00", "2024-01-01T00:00:00"),
            "2024-02-01T00:00:00"
        );
        assert_eq!(
            latest_of("2024-01-01T00:00:00", "2024-02-01T00:00:00"),
            "2024-02-01T00:00:00"
        );
        assert_eq!(latest_of("garbage", "2024-02-01T00:00:00"), "2024-02-01T00:00:00");
    }
}
