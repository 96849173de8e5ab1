use serde::Serialize;
use tracing::trace;

use crate::date::{days_in_month, month_label, weekday_offset, CalendarDate};
use crate::navigation::CalendarCursor;

/// One visible square of the month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayCell {
    /// Padding from the previous month, shown for layout only
    Leading { day: u32 },

    /// A day of the displayed month
    Current { day: u32, month: u32, year: i32 },
}

impl DayCell {
    pub fn day(&self) -> u32 {
        match *self {
            DayCell::Leading { day } | DayCell::Current { day, .. } => day,
        }
    }

    pub fn is_leading(&self) -> bool {
        matches!(self, DayCell::Leading { .. })
    }

    /// The calendar date this cell stands for. Leading cells have none.
    pub fn date(&self) -> Option<CalendarDate> {
        match *self {
            DayCell::Leading { .. } => None,
            DayCell::Current { day, month, year } => CalendarDate::new(year, month, day).ok(),
        }
    }
}

/// The cells of one month, ready to be laid out seven per row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub cursor: CalendarCursor,
    pub label: String,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    /// Number of previous-month padding cells
    pub fn leading_count(&self) -> usize {
        self.cells.iter().take_while(|c| c.is_leading()).count()
    }

    /// Cells belonging to the displayed month
    pub fn current_days(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter(|c| !c.is_leading())
    }

    /// Rows of seven cells, Sunday first. The last row may be shorter.
    pub fn weeks(&self) -> std::slice::Chunks<'_, DayCell> {
        self.cells.chunks(7)
    }
}

/// Build the grid for the month under the cursor.
///
/// Leading cells carry the trailing days of the previous month, one per
/// weekday before the 1st; then every day of the month follows in order.
pub fn build_grid(cursor: CalendarCursor) -> MonthGrid {
    let month = cursor.month();
    let year = cursor.year();

    let offset = weekday_offset(month, year);
    let days = days_in_month(month, year);
    let previous = cursor.advance(-1);
    let days_in_previous = days_in_month(previous.month(), previous.year());

    let mut cells = Vec::with_capacity((offset + days) as usize);
    cells.extend((1..=offset).rev().map(|i| DayCell::Leading {
        day: days_in_previous - i + 1,
    }));
    cells.extend((1..=days).map(|day| DayCell::Current { day, month, year }));

    trace!(month, year, leading = offset, days, "Built month grid");

    MonthGrid {
        cursor,
        label: month_label(month, year),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(month: u32, year: i32) -> CalendarCursor {
        CalendarCursor::new(month, year).unwrap()
    }

    #[test]
    fn test_cell_count_is_offset_plus_days() {
        for year in [1970, 2000, 2023, 2024, 2100] {
            for month in 0..12 {
                let grid = build_grid(cursor(month, year));
                let expected = weekday_offset(month, year) + days_in_month(month, year);
                assert_eq!(grid.cells.len() as u32, expected, "{year}-{month}");
            }
        }
    }

    #[test]
    fn test_current_days_run_without_gaps() {
        let grid = build_grid(cursor(1, 2024));
        let days: Vec<u32> = grid.current_days().map(|c| c.day()).collect();
        assert_eq!(days, (1..=29).collect::<Vec<_>>());
    }

    #[test]
    fn test_current_cells_carry_identity() {
        let grid = build_grid(cursor(2, 2024));
        for cell in grid.current_days() {
            match *cell {
                DayCell::Current { month, year, .. } => {
                    assert_eq!(month, 2);
                    assert_eq!(year, 2024);
                }
                DayCell::Leading { .. } => panic!("leading cell after day 1"),
            }
        }
    }

    #[test]
    fn test_leading_cells_are_previous_month_tail() {
        // March 2024 starts on a Friday: 5 leading days, Feb 25..=29
        let grid = build_grid(cursor(2, 2024));
        assert_eq!(grid.leading_count(), 5);
        let leading: Vec<u32> = grid.cells[..5].iter().map(|c| c.day()).collect();
        assert_eq!(leading, vec![25, 26, 27, 28, 29]);
        assert!(grid.cells[..5].iter().all(|c| c.date().is_none()));
    }

    #[test]
    fn test_january_pads_from_previous_december() {
        // January 2025 starts on a Wednesday: Dec 29, 30, 31
        let grid = build_grid(cursor(0, 2025));
        let leading: Vec<u32> = grid
            .cells
            .iter()
            .take_while(|c| c.is_leading())
            .map(|c| c.day())
            .collect();
        assert_eq!(leading, vec![29, 30, 31]);
    }

    #[test]
    fn test_month_starting_sunday_has_no_padding() {
        let grid = build_grid(cursor(9, 2023));
        assert_eq!(grid.leading_count(), 0);
        assert_eq!(grid.cells[0].day(), 1);
    }

    #[test]
    fn test_label() {
        assert_eq!(build_grid(cursor(2, 2024)).label, "March / 2024");
    }

    #[test]
    fn test_weeks_chunk_by_seven() {
        let grid = build_grid(cursor(2, 2024));
        let weeks: Vec<_> = grid.weeks().collect();
        // 5 + 31 = 36 cells
        assert_eq!(weeks.len(), 6);
        assert!(weeks[..5].iter().all(|w| w.len() == 7));
        assert_eq!(weeks[5].len(), 1);
    }

    #[test]
    fn test_cell_date() {
        let cell = DayCell::Current {
            day: 10,
            month: 2,
            year: 2024,
        };
        assert_eq!(cell.date(), Some(CalendarDate::parse("2024-03-10").unwrap()));
    }

    #[test]
    fn test_cell_serialization() {
        let cell = DayCell::Leading { day: 30 };
        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(json, r#"{"kind":"leading","day":30}"#);
    }
}
