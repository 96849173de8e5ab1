//! The (month, year) cursor and the controller that owns it.

use chrono::{Datelike, Local};
use serde::Serialize;
use tracing::debug;

use crate::date::{first_of_month, CalendarDate};
use crate::error::CalendarError;
use crate::grid::{build_grid, MonthGrid};
use crate::highlight::{highlight, Highlights};

/// Earliest year accepted from the year input
pub const MIN_YEAR: i32 = 1970;

/// Latest year accepted from the year input
pub const MAX_YEAR: i32 = 2100;

/// The displayed month. `month` is always within 0..=11, and both this month
/// and the one before it are dates chrono can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CalendarCursor {
    month: u32,
    year: i32,
}

impl CalendarCursor {
    pub fn new(month: u32, year: i32) -> Result<Self, CalendarError> {
        if month > 11 {
            return Err(CalendarError::InvalidMonth(month));
        }
        if !is_displayable(month, year) {
            return Err(CalendarError::YearOutOfRange(year));
        }
        Ok(Self { month, year })
    }

    /// Cursor on the month containing `date`
    pub fn from_date(date: CalendarDate) -> Result<Self, CalendarError> {
        Self::new(date.month(), date.year())
    }

    /// Cursor on the current local month
    pub fn today() -> Self {
        let now = Local::now().date_naive();
        Self {
            month: now.month0(),
            year: now.year(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Move by any number of months, carrying into the year as needed.
    ///
    /// A move that would leave the representable calendar leaves the cursor
    /// where it is.
    pub fn advance(self, delta_months: i32) -> Self {
        let raw = i64::from(self.month) + i64::from(delta_months);
        let month = raw.rem_euclid(12) as u32;
        let year = i64::from(self.year) + raw.div_euclid(12);

        match i32::try_from(year) {
            Ok(year) if is_displayable(month, year) => Self { month, year },
            _ => self,
        }
    }

    /// Replace the year with the one typed into the year input.
    ///
    /// The text must be an integer between [`MIN_YEAR`] and [`MAX_YEAR`]
    /// inclusive; the month is kept.
    pub fn set_year(self, year_text: &str) -> Result<Self, CalendarError> {
        let year: i32 = year_text
            .trim()
            .parse()
            .map_err(|_| CalendarError::InvalidYear(year_text.to_string()))?;

        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalendarError::InvalidYear(year_text.to_string()));
        }

        Ok(Self { year, ..self })
    }
}

/// The month and the last day before it (the leading cells) both exist
fn is_displayable(month: u32, year: i32) -> bool {
    first_of_month(month, year)
        .and_then(|first| first.pred_opt())
        .is_some()
}

/// Display surface for the month grid.
///
/// The navigator calls `render` after every successful change and
/// `render_rejection` when an input was refused.
pub trait GridRenderer {
    fn render(&mut self, grid: &MonthGrid, highlights: &Highlights);

    fn render_rejection(&mut self, _error: &CalendarError) {}
}

/// Owns the cursor and the current range inputs, and re-renders after each
/// navigation, year change or range edit.
#[derive(Debug)]
pub struct Navigator<R> {
    cursor: CalendarCursor,
    start_input: String,
    end_input: String,
    renderer: R,
}

impl<R: GridRenderer> Navigator<R> {
    pub fn new(cursor: CalendarCursor, renderer: R) -> Self {
        Self {
            cursor,
            start_input: String::new(),
            end_input: String::new(),
            renderer,
        }
    }

    /// Seed the range inputs without rendering
    pub fn with_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_input = start.into();
        self.end_input = end.into();
        self
    }

    pub fn cursor(&self) -> CalendarCursor {
        self.cursor
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Rebuild the grid, re-run the highlighter and hand both to the renderer.
    pub fn refresh(&mut self) {
        let grid = build_grid(self.cursor);
        let highlights = match highlight(&grid, &self.start_input, &self.end_input) {
            Ok(highlights) => highlights,
            Err(e) => {
                debug!(error = %e, "Range not highlighted");
                Highlights::none(&grid)
            }
        };
        self.renderer.render(&grid, &highlights);
    }

    /// Previous/next month commands
    pub fn navigate(&mut self, delta_months: i32) {
        self.cursor = self.cursor.advance(delta_months);
        debug!(
            month = self.cursor.month(),
            year = self.cursor.year(),
            delta = delta_months,
            "Navigated"
        );
        self.refresh();
    }

    /// Apply the year input. On rejection the cursor is unchanged and the
    /// renderer is told why.
    pub fn change_year(&mut self, year_text: &str) -> Result<(), CalendarError> {
        match self.cursor.set_year(year_text) {
            Ok(cursor) => {
                self.cursor = cursor;
                self.refresh();
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "Year rejected");
                self.renderer.render_rejection(&e);
                Err(e)
            }
        }
    }

    /// The start or end date input changed
    pub fn set_range(&mut self, start: impl Into<String>, end: impl Into<String>) {
        self.start_input = start.into();
        self.end_input = end.into();
        self.refresh();
    }
}
