//! Plain-text month grid for the terminal.
//!
//! Each cell is four characters wide. Padding days from the previous month
//! are parenthesised; the range start opens with `[`, the end closes with
//! `]` and days in between are wrapped in `-`.

use calendario::{
    CalendarError, CellView, DayCell, GridRenderer, Highlight, Highlights, MonthGrid, MonthView,
};

const HEADER: &str = " Su  Mo  Tu  We  Th  Fr  Sa";

#[derive(Debug, Default)]
pub struct TextRenderer {
    output: String,
}

impl TextRenderer {
    pub fn into_output(self) -> String {
        self.output
    }
}

impl GridRenderer for TextRenderer {
    fn render(&mut self, grid: &MonthGrid, highlights: &Highlights) {
        let view = MonthView::new(grid, highlights);

        self.output
            .push_str(&format!("{:^width$}\n", view.label, width = HEADER.len()));
        self.output.push_str(HEADER);
        self.output.push('\n');

        for week in view.weeks() {
            let row: String = week.iter().map(format_cell).collect();
            self.output.push_str(row.trim_end());
            self.output.push('\n');
        }
    }

    fn render_rejection(&mut self, error: &CalendarError) {
        self.output.push_str(&format!("! {}\n", error));
    }
}

fn format_cell(view: &CellView) -> String {
    match view.cell {
        DayCell::Leading { day } => format!("({:>2})", day),
        DayCell::Current { day, .. } => match view.highlight {
            Highlight::Start => format!("[{:>2} ", day),
            Highlight::End => format!(" {:>2}]", day),
            Highlight::Middle => format!("-{:>2}-", day),
            Highlight::None => format!(" {:>2} ", day),
        },
    }
}
