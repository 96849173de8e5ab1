//! Classification of grid cells against a selected date range.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::date::CalendarDate;
use crate::error::CalendarError;
use crate::grid::{DayCell, MonthGrid};

/// Where a day sits relative to the selected range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    Start,
    Middle,
    End,
    #[default]
    None,
}

impl Highlight {
    /// CSS class the HTML renderer attaches to the cell
    pub fn css_class(&self) -> &'static str {
        match self {
            Highlight::Start => "range-start",
            Highlight::Middle => "range-middle",
            Highlight::End => "range-end",
            Highlight::None => "",
        }
    }

    pub fn is_highlighted(&self) -> bool {
        !matches!(self, Highlight::None)
    }
}

/// A start/end pair read from the two date inputs.
///
/// `start <= end` is not enforced here; an inverted range is simply empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: CalendarDate,
    pub end: CalendarDate,
}

impl DateRange {
    pub fn new(start: CalendarDate, end: CalendarDate) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, CalendarError> {
        Ok(Self {
            start: CalendarDate::parse(start)?,
            end: CalendarDate::parse(end)?,
        })
    }

    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }

    /// Classify one day. Equality with the start wins over equality with the
    /// end, so a single-day range is marked `Start`.
    pub fn classify(&self, date: CalendarDate) -> Highlight {
        if self.is_inverted() {
            Highlight::None
        } else if date == self.start {
            Highlight::Start
        } else if date == self.end {
            Highlight::End
        } else if date > self.start && date < self.end {
            Highlight::Middle
        } else {
            Highlight::None
        }
    }
}

/// Classification of every day of a grid, keyed by date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Highlights {
    by_date: BTreeMap<CalendarDate, Highlight>,
}

impl Highlights {
    /// Every day of the grid left unmarked
    pub fn none(grid: &MonthGrid) -> Self {
        Self {
            by_date: grid
                .current_days()
                .filter_map(DayCell::date)
                .map(|date| (date, Highlight::None))
                .collect(),
        }
    }

    pub fn classify(grid: &MonthGrid, range: &DateRange) -> Self {
        Self {
            by_date: grid
                .current_days()
                .filter_map(DayCell::date)
                .map(|date| (date, range.classify(date)))
                .collect(),
        }
    }

    /// Highlight for a cell. Leading cells are never highlighted.
    pub fn get(&self, cell: &DayCell) -> Highlight {
        cell.date()
            .and_then(|date| self.by_date.get(&date).copied())
            .unwrap_or_default()
    }

    pub fn get_date(&self, date: &CalendarDate) -> Highlight {
        self.by_date.get(date).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CalendarDate, &Highlight)> {
        self.by_date.iter()
    }

    pub fn count(&self, highlight: Highlight) -> usize {
        self.by_date.values().filter(|h| **h == highlight).count()
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

/// Classify every day of `grid` against the range typed into the two inputs.
///
/// Unreadable input fails with [`CalendarError::InvalidDateInput`]; callers
/// fall back to [`Highlights::none`].
pub fn highlight(grid: &MonthGrid, start: &str, end: &str) -> Result<Highlights, CalendarError> {
    let range = DateRange::parse(start, end)?;
    if range.is_inverted() {
        debug!(start = %range.start, end = %range.end, "Range ends before it starts");
    }
    Ok(Highlights::classify(grid, &range))
}
