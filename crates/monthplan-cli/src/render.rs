use std::io::{self, IsTerminal, Write};

use chrono::{NaiveDate, Weekday};
use monthplan_core::config::LayoutMetrics;
use monthplan_core::grid::{
    DAYS_PER_WEEK, build_cells, format_day_number, format_iso_date, format_month_year, grid_start,
    weekday_labels,
};
use monthplan_core::layout::layout_tasks;
use monthplan_core::task::{Category, Task, TaskCategory};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    /// Colors output only when stdout is a terminal.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            color: io::stdout().is_terminal(),
        }
    }

    #[must_use]
    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, out, tasks))]
    pub fn print_task_table<W: Write>(&self, out: &mut W, tasks: &[Task]) -> anyhow::Result<()> {
        let headers = vec![
            "ID".to_string(),
            "Category".to_string(),
            "Start".to_string(),
            "End".to_string(),
            "Days".to_string(),
            "Name".to_string(),
        ];

        let rows = tasks
            .iter()
            .map(|task| {
                vec![
                    task.id.clone(),
                    self.paint(task.category.label(), category_ansi(&task.category)),
                    format_iso_date(task.start),
                    format_iso_date(task.end),
                    task.duration_days().to_string(),
                    task.name.clone(),
                ]
            })
            .collect();

        write_table(out, headers, rows)
    }

    #[tracing::instrument(skip(self, out, task))]
    pub fn print_task_info<W: Write>(&self, out: &mut W, task: &Task) -> anyhow::Result<()> {
        writeln!(out, "id        {}", task.id)?;
        writeln!(out, "name      {}", task.name)?;
        writeln!(
            out,
            "category  {}",
            self.paint(task.category.label(), category_ansi(&task.category))
        )?;
        writeln!(out, "color     {}", task.color())?;
        writeln!(out, "start     {}", format_iso_date(task.start))?;
        writeln!(out, "end       {}", format_iso_date(task.end))?;
        writeln!(out, "days      {}", task.duration_days())?;
        Ok(())
    }

    /// Day-number grid for the month containing `focus`, followed by
    /// one row per bar placement.
    #[tracing::instrument(skip(self, out, tasks, metrics))]
    pub fn print_month<W: Write>(
        &self,
        out: &mut W,
        focus: NaiveDate,
        week_start: Weekday,
        today: NaiveDate,
        tasks: &[Task],
        metrics: &LayoutMetrics,
    ) -> anyhow::Result<()> {
        writeln!(out, "{}", format_month_year(focus))?;
        writeln!(out, "{}", weekday_labels(week_start).join("  "))?;

        let cells = build_cells(focus, week_start, today, None);
        for week in cells.chunks(DAYS_PER_WEEK) {
            let line = week
                .iter()
                .map(|cell| {
                    let number = format!("{:>3}", format_day_number(cell.date));
                    if cell.is_today {
                        self.paint(&number, "7")
                    } else if !cell.in_month {
                        self.paint(&number, "2")
                    } else {
                        number
                    }
                })
                .collect::<Vec<_>>()
                .join("  ");
            writeln!(out, "{line}")?;
        }
        writeln!(out)?;

        let placements = layout_tasks(tasks, grid_start(focus, week_start), metrics);
        let headers = vec![
            "Week".to_string(),
            "Slot".to_string(),
            "Columns".to_string(),
            "Name".to_string(),
        ];
        let rows = placements
            .iter()
            .map(|placement| {
                let task = &tasks[placement.task_index];
                vec![
                    placement.week.to_string(),
                    placement.slot.to_string(),
                    format!("{}-{}", placement.start_col, placement.end_col),
                    self.paint(&task.name, category_ansi(&task.category)),
                ]
            })
            .collect();

        write_table(out, headers, rows)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn category_ansi(category: &TaskCategory) -> &'static str {
    match category.known() {
        Some(Category::ToDo) => "34",
        Some(Category::InProgress) => "33",
        Some(Category::Review) => "35",
        Some(Category::Completed) => "32",
        None => "90",
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, &width) in headers.iter().zip(&widths) {
        write!(writer, "{header:width$} ")?;
    }
    writeln!(writer)?;

    for &width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, &width) in row.iter().zip(&widths) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
