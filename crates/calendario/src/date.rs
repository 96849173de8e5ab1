//! Calendar date value type and month arithmetic.
//!
//! Months are 0-based (0 = January) everywhere in this crate, matching the
//! cursor the grid is driven by. Only the `YYYY-MM-DD` text form uses the
//! usual 1-based month.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalendarError;

/// Month names used for the grid label
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Day 1 of a 0-based month, if chrono can represent it
pub fn first_of_month(month: u32, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1)
}

/// Number of days in the given 0-based month, or 0 when there is no such month.
pub fn days_in_month(month: u32, year: i32) -> u32 {
    match month {
        0..=10 => first_of_month(month + 1, year)
            .and_then(|next| next.pred_opt())
            .map_or(0, |last| last.day()),
        // December has no next month within the same year to step back from
        11 if first_of_month(month, year).is_some() => 31,
        _ => 0,
    }
}

/// Weekday of day 1 of the month, 0 = Sunday.
pub fn weekday_offset(month: u32, year: i32) -> u32 {
    first_of_month(month, year)
        .map_or(0, |first| first.weekday().num_days_from_sunday())
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month % 12) as usize]
}

/// Human-readable grid title, e.g. `"March / 2024"`.
pub fn month_label(month: u32, year: i32) -> String {
    format!("{} / {}", month_name(month), year)
}

/// A day on the local calendar, with no time or zone attached.
///
/// Parsing splits the text into its components instead of going through a
/// timestamp, so `2024-03-01` is always March 1st whatever the host offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Build a date from a 0-based month.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        NaiveDate::from_ymd_opt(year, month + 1, day)
            .map(Self)
            .ok_or(CalendarError::InvalidDate {
                year,
                month: month + 1,
                day,
            })
    }

    /// Parse `YYYY-MM-DD` text into a date.
    pub fn parse(text: &str) -> Result<Self, CalendarError> {
        let invalid = || CalendarError::InvalidDateInput(text.to_string());

        let mut parts = text.trim().split('-');
        let (Some(year), Some(month), Some(day), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let day: u32 = day.parse().map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(invalid)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 0-based month
    pub fn month(&self) -> u32 {
        self.0.month0()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for CalendarDate {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CalendarDate> for String {
    fn from(date: CalendarDate) -> Self {
        date.to_string()
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}
