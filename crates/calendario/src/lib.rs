//! Calendario - the calendar core behind the agenda server.
//!
//! Builds the cells of a month grid, classifies each day against a selected
//! date range and moves a (month, year) cursor around. Nothing in here knows
//! how the grid is displayed: renderers plug in through [`GridRenderer`].

pub mod date;
pub mod error;
pub mod grid;
pub mod highlight;
pub mod navigation;
pub mod view;

pub use date::{
    days_in_month, first_of_month, month_label, month_name, weekday_offset, CalendarDate,
};
pub use error::CalendarError;
pub use grid::{build_grid, DayCell, MonthGrid};
pub use highlight::{highlight, DateRange, Highlight, Highlights};
pub use navigation::{CalendarCursor, GridRenderer, Navigator, MAX_YEAR, MIN_YEAR};
pub use view::{CellView, MonthView, ViewRecorder};
