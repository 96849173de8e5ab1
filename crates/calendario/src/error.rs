use thiserror::Error;

use crate::navigation::{MAX_YEAR, MIN_YEAR};

/// Errors raised by the calendar core.
///
/// None of these are fatal: the navigator turns them into a rejection notice
/// or an empty highlight, and the cursor is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// Year text that is not an integer or falls outside the supported range
    #[error("Invalid year: {0:?} (use a value between {MIN_YEAR} and {MAX_YEAR})")]
    InvalidYear(String),

    /// Year chrono cannot place a month grid in
    #[error("Year {0} is outside the supported calendar")]
    YearOutOfRange(i32),

    /// Month index outside 0..=11
    #[error("Invalid month index: {0} (must be 0-11)")]
    InvalidMonth(u32),

    /// Date text that does not read as YYYY-MM-DD
    #[error("Invalid date input: {0:?} (expected YYYY-MM-DD)")]
    InvalidDateInput(String),

    /// Components that do not name a real calendar day
    #[error("Invalid date: {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
}
