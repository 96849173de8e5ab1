use serde::Serialize;

use crate::error::CalendarError;
use crate::grid::{DayCell, MonthGrid};
use crate::highlight::{Highlight, Highlights};
use crate::navigation::{CalendarCursor, GridRenderer};

/// A cell paired with its classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellView {
    #[serde(flatten)]
    pub cell: DayCell,
    pub highlight: Highlight,
}

/// Flattened render input: what a display surface needs to draw one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthView {
    pub cursor: CalendarCursor,
    pub label: String,
    pub cells: Vec<CellView>,
}

impl MonthView {
    pub fn new(grid: &MonthGrid, highlights: &Highlights) -> Self {
        Self {
            cursor: grid.cursor,
            label: grid.label.clone(),
            cells: grid
                .cells
                .iter()
                .map(|cell| CellView {
                    cell: *cell,
                    highlight: highlights.get(cell),
                })
                .collect(),
        }
    }

    pub fn weeks(&self) -> std::slice::Chunks<'_, CellView> {
        self.cells.chunks(7)
    }
}

/// Renderer that keeps the latest frame and rejection for a later pass,
/// e.g. a page template or a JSON response.
#[derive(Debug, Default)]
pub struct ViewRecorder {
    view: Option<MonthView>,
    rejection: Option<String>,
}

impl ViewRecorder {
    pub fn view(&self) -> Option<&MonthView> {
        self.view.as_ref()
    }

    pub fn rejection(&self) -> Option<&str> {
        self.rejection.as_deref()
    }

    pub fn into_parts(self) -> (Option<MonthView>, Option<String>) {
        (self.view, self.rejection)
    }
}

impl GridRenderer for ViewRecorder {
    fn render(&mut self, grid: &MonthGrid, highlights: &Highlights) {
        self.view = Some(MonthView::new(grid, highlights));
    }

    fn render_rejection(&mut self, error: &CalendarError) {
        self.rejection = Some(error.to_string());
    }
}
