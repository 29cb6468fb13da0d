//! Member number and membership term helpers.

use chrono::{Months, NaiveDate};

/// `{prefix}-{year}-{sequence:04}`, e.g. `M-2024-0001`.
pub fn format_member_number(prefix: &str, year: i32, sequence: u32) -> String {
    format!("{prefix}-{year}-{sequence:04}")
}

/// Expiration date one membership term after `start`, clamped to month end.
pub fn expiration_after(start: NaiveDate, term_months: u32) -> NaiveDate {
    start
        .checked_add_months(Months::new(term_months))
        .unwrap_or(NaiveDate::MAX)
}
