use anyhow::Result;
use calendario::{CellView, DayCell, MonthView};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::fs;
use std::path::Path;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Importance levels offered in the commitment form, as (value, label)
const IMPORTANCE_OPTIONS: [(&str, &str); 6] = [
    ("none", "None"),
    ("small", "Small"),
    ("medium", "Medium"),
    ("large", "Large"),
    ("extreme", "Extreme"),
    ("exclusive", "Exclusive"),
];

/// Values typed into the range inputs, echoed back into the forms
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeInputs<'a> {
    pub start: &'a str,
    pub end: &'a str,
}

/// Write a standalone calendar page to disk
pub fn generate_html(view: &MonthView, range: RangeInputs<'_>, path: &Path) -> Result<()> {
    let html = render_page(view, None, range);
    fs::write(path, html.into_string())?;
    Ok(())
}

pub fn render_page(view: &MonthView, notice: Option<&str>, range: RangeInputs<'_>) -> Markup {
    let month = view.cursor.month();
    let year = view.cursor.year();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Agenda" }
                style { (PreEscaped(CSS)) }
            }
            body {
                div.container {
                    h1 { "Agenda" }

                    @if let Some(message) = notice {
                        div.notice role="alert" { (message) }
                    }

                    div.calendar {
                        form.month-nav method="get" action="/" {
                            input type="hidden" name="month" value=(month);
                            input type="hidden" name="year" value=(year);
                            input type="hidden" name="start" value=(range.start);
                            input type="hidden" name="end" value=(range.end);
                            button type="submit" name="nav" value="-1" { "‹" }
                            span #"month-year-display" { (view.label) }
                            button type="submit" name="nav" value="1" { "›" }
                        }

                        form.year-form method="get" action="/" {
                            input type="hidden" name="month" value=(month);
                            input type="hidden" name="year" value=(year);
                            input type="hidden" name="start" value=(range.start);
                            input type="hidden" name="end" value=(range.end);
                            input #"yearInput" type="text" name="year_input" value=(year) size="5";
                            button type="submit" { "Go" }
                        }

                        (render_grid(view))
                    }

                    form.range-form #"range-form" method="get" action="/" {
                        input type="hidden" name="month" value=(month);
                        input type="hidden" name="year" value=(year);
                        label {
                            "From "
                            input #"start" type="date" name="start" value=(range.start);
                        }
                        label {
                            "To "
                            input #"end" type="date" name="end" value=(range.end);
                        }
                        button type="submit" { "Highlight" }
                    }

                    form.commitment-form #"commitment-form" {
                        input #"task" type="text" name="task" placeholder="Task";
                        input #"start-time" type="time" name="start_time";
                        input #"end-time" type="time" name="end_time";
                        select #"importance" name="importance" {
                            @for (value, label) in IMPORTANCE_OPTIONS {
                                option value=(value) { (label) }
                            }
                        }
                        button type="submit" { "Save" }
                        span #"save-status" {}
                    }
                }
                script { (PreEscaped(JAVASCRIPT)) }
            }
        }
    }
}

fn render_grid(view: &MonthView) -> Markup {
    html! {
        div.weekdays {
            @for name in WEEKDAYS {
                span { (name) }
            }
        }
        div.number-days {
            @for week in view.weeks() {
                @for cell in week {
                    (render_cell(cell))
                }
                @for _ in week.len()..7 {
                    span.blank {}
                }
            }
        }
    }
}

fn render_cell(view: &CellView) -> Markup {
    match view.cell {
        DayCell::Leading { day } => html! {
            span.previous-month { (day) }
        },
        DayCell::Current { day, month, year } => html! {
            span class={ "day " (view.highlight.css_class()) }
                data-day=(day) data-month=(month) data-year=(year) { (day) }
        },
    }
}

const CSS: &str = r#"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    background: #101418;
    color: #eee;
    min-height: 100vh;
    line-height: 1.4;
}

.container {
    max-width: 640px;
    margin: 0 auto;
    padding: 40px 20px 60px;
}

h1 {
    font-weight: 800;
    font-size: 2.4em;
    letter-spacing: -0.02em;
    margin-bottom: 24px;
}

.notice {
    background: rgba(255, 80, 80, 0.15);
    border: 1px solid #ff5050;
    padding: 10px 14px;
    margin-bottom: 20px;
}

.calendar {
    background: rgba(255, 255, 255, 0.04);
    border: 1px solid rgba(255, 255, 255, 0.1);
    padding: 20px;
    margin-bottom: 24px;
}

.month-nav {
    display: flex;
    align-items: center;
    justify-content: space-between;
    margin-bottom: 12px;
}

#month-year-display {
    font-weight: 700;
    font-size: 1.2em;
}

.year-form {
    margin-bottom: 16px;
}

.weekdays,
.number-days {
    display: grid;
    grid-template-columns: repeat(7, 1fr);
    gap: 4px;
    text-align: center;
}

.weekdays span {
    color: #888;
    font-size: 0.8em;
    text-transform: uppercase;
    padding-bottom: 6px;
}

.number-days span {
    padding: 10px 0;
}

.previous-month {
    color: #555;
}

.day.range-start,
.day.range-end {
    background: #2a9d8f;
    color: #fff;
    font-weight: 700;
}

.day.range-start {
    border-radius: 50% 0 0 50%;
}

.day.range-end {
    border-radius: 0 50% 50% 0;
}

.day.range-middle {
    background: rgba(42, 157, 143, 0.35);
}

.range-form,
.commitment-form {
    display: flex;
    flex-wrap: wrap;
    gap: 10px;
    margin-bottom: 16px;
}

button {
    cursor: pointer;
    padding: 4px 12px;
}
"#;

const JAVASCRIPT: &str = r#"
// Re-highlight as soon as a date changes
document.querySelectorAll('#range-form input[type=date]').forEach(input => {
    input.addEventListener('change', () => input.form.submit());
});

// Save the commitment with the dates from the range inputs
document.getElementById('commitment-form').addEventListener('submit', async event => {
    event.preventDefault();
    const status = document.getElementById('save-status');
    const body = {
        task: document.getElementById('task').value.trim(),
        start_date: document.getElementById('start').value,
        end_date: document.getElementById('end').value,
        start_time: document.getElementById('start-time').value,
        end_time: document.getElementById('end-time').value,
        importance: document.getElementById('importance').value
    };

    try {
        const res = await fetch('/save', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify(body),
            credentials: 'same-origin'
        });
        status.textContent = res.ok ? 'Saved' : await res.text();
        if (res.ok) event.target.reset();
    } catch (err) {
        status.textContent = 'Failed: ' + err.message;
    }
});
"#;
