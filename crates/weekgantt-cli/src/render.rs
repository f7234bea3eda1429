//! Terminal and JSON views of an editing session
//!
//! The text chart draws one character per 8 pixels of the layout, so zoom
//! and collapsed months change the picture exactly as they would on screen.
//!
//! ## Example Output
//!
//! ```text
//! Relaunch
//! 4 weeks, 1 payments, 1 sub-tasks
//!
//!                                    |Jan 202
//!    0 Design                    ....##==
//!  0.1   Wireframes              ....==
//!    💰 Advance                   ....   ◆
//! ```

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;
use weekgantt_core::status::ProjectSummary;
use weekgantt_core::visibility::hidden_counts;
use weekgantt_core::{Locale, Task, TaskKind};
use weekgantt_editor::{EditorSession, LayoutMapper};

/// Layout pixels per output character
pub const PX_PER_CHAR: f64 = 8.0;

/// Width of the number and name column
const LABEL_WIDTH: usize = 30;

const PADDING_CHAR: char = '.';
const DONE_CHAR: char = '#';
const REMAINING_CHAR: char = '=';
const PAYMENT_CHAR: char = '◆';
const MARKER_CHAR: char = '|';

// ============================================================================
// Text Chart
// ============================================================================

/// Render the visible rows of `session` as a text Gantt chart
pub fn render_text(session: &EditorSession, today: NaiveDate) -> String {
    let layout = session.layout();
    let timeline = session.timeline();
    let config = session.config();
    let locale = config.lang;
    let columns = column(layout.total_width());
    let today_col = timeline
        .today_index(today)
        .and_then(|i| layout.today_x(i))
        .map(column);

    let mut out = String::new();
    let title = if config.project_title.is_empty() {
        default_title(locale)
    } else {
        config.project_title.as_str()
    };
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", session.summary(today));
    out.push('\n');

    // Month header
    let mut header = vec![' '; columns];
    for (i, month) in timeline.months.iter().enumerate() {
        if session.view().collapsed_months.contains(&i) {
            continue;
        }
        let start = column(layout.x_for_week(month.first_week as i32));
        let span = column(layout.span_width(month.first_week as i32, month.count as u32));
        put(&mut header, start, MARKER_CHAR);
        for (offset, ch) in month.label.chars().take(span.saturating_sub(1)).enumerate() {
            put(&mut header, start + 1 + offset, ch);
        }
    }
    let _ = writeln!(out, "{} {}", " ".repeat(LABEL_WIDTH), collect(&header));

    // Rows
    let hidden = hidden_counts(session.tasks(), &session.view().collapsed_groups);
    for task in session.visible_rows() {
        let hidden_subs = hidden
            .iter()
            .find(|(id, _)| *id == task.id)
            .map_or(0, |(_, n)| *n);
        let label = fit(&row_label(task, locale, hidden_subs), LABEL_WIDTH);

        let mut canvas = base_row(&layout, columns);
        if let Some(col) = today_col {
            put(&mut canvas, col, MARKER_CHAR);
        }
        draw_task(&mut canvas, &layout, task);
        let _ = writeln!(out, "{label} {}", collect(&canvas));
    }

    let collapsed: Vec<&str> = session
        .view()
        .collapsed_months
        .iter()
        .filter_map(|i| timeline.months.get(*i))
        .map(|m| m.label.as_str())
        .collect();
    if !collapsed.is_empty() {
        let _ = writeln!(out, "\nCollapsed: {}", collapsed.join(", "));
    }
    out
}

fn default_title(locale: Locale) -> &'static str {
    match locale {
        Locale::Vi => "Kế hoạch dự án",
        Locale::En => "Project schedule",
    }
}

fn row_label(task: &Task, locale: Locale, hidden_subs: usize) -> String {
    let indent = "  ".repeat(task.level.min(3) as usize);
    let mut label = format!("{:>4} {indent}{}", task.no, task.name(locale));
    if hidden_subs > 0 {
        let _ = write!(label, " (+{hidden_subs})");
    }
    label
}

/// Empty row with the padding columns marked
fn base_row(layout: &LayoutMapper, columns: usize) -> Vec<char> {
    let padding = column(layout.padding_width()).min(columns);
    let mut row = vec![' '; columns];
    row[..padding].fill(PADDING_CHAR);
    row
}

fn draw_task(canvas: &mut [char], layout: &LayoutMapper, task: &Task) {
    let bar = layout.bar_geometry(task);
    if task.kind == TaskKind::Payment {
        put(canvas, column(bar.left + layout.cell_width() / 2.0), PAYMENT_CHAR);
        return;
    }
    if bar.width <= 0.0 {
        return;
    }
    let from = column(bar.left);
    let to = column(bar.right()).max(from + 1);
    let done = column(bar.left + bar.width * f64::from(task.progress) / 100.0);
    for col in from..to {
        put(canvas, col, if col < done { DONE_CHAR } else { REMAINING_CHAR });
    }
}

fn column(x: f64) -> usize {
    (x.max(0.0) / PX_PER_CHAR).round() as usize
}

fn put(canvas: &mut [char], col: usize, ch: char) {
    if let Some(cell) = canvas.get_mut(col) {
        *cell = ch;
    }
}

fn collect(canvas: &[char]) -> String {
    canvas.iter().collect::<String>().trim_end().to_string()
}

/// Truncate or pad to exactly `width` characters
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        format!("{text}{}", " ".repeat(width - count))
    }
}

// ============================================================================
// JSON Report
// ============================================================================

/// Everything `show --format json` prints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowReport {
    pub title: String,
    pub lang: Locale,
    pub cell_width: u32,
    pub total_width: f64,
    pub summary: ProjectSummary,
    pub months: Vec<MonthReport>,
    pub rows: Vec<RowReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthReport {
    pub label: String,
    pub first_week: usize,
    pub count: usize,
    pub collapsed: bool,
    pub width: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowReport {
    pub id: String,
    pub no: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub name: String,
    pub level: u32,
    pub group: usize,
    pub color: String,
    pub start_week: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    pub progress: u8,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub left: f64,
    pub width: f64,
    pub hidden_sub_items: usize,
}

/// Structured view of the visible rows and their geometry
pub fn report(session: &EditorSession, today: NaiveDate) -> ShowReport {
    let layout = session.layout();
    let timeline = session.timeline();
    let config = session.config();
    let hidden = hidden_counts(session.tasks(), &session.view().collapsed_groups);

    let months = timeline
        .months
        .iter()
        .enumerate()
        .map(|(i, m)| MonthReport {
            label: m.label.clone(),
            first_week: m.first_week,
            count: m.count,
            collapsed: session.view().collapsed_months.contains(&i),
            width: layout.month_header_width(i).unwrap_or(0.0),
        })
        .collect();

    let rows = session
        .visible_rows()
        .into_iter()
        .map(|task| {
            let bar = layout.bar_geometry(task);
            let (start_date, end_date) = timeline.task_dates(task);
            RowReport {
                id: task.id.clone(),
                no: task.no.clone(),
                kind: task.kind,
                name: task.name(config.lang).to_string(),
                level: task.level,
                group: task.group,
                color: task.display_color.clone(),
                start_week: task.start_week,
                duration: task.duration,
                progress: task.progress,
                start_date,
                end_date,
                left: bar.left,
                width: bar.width,
                hidden_sub_items: hidden
                    .iter()
                    .find(|(id, _)| *id == task.id)
                    .map_or(0, |(_, n)| *n),
            }
        })
        .collect();

    ShowReport {
        title: config.project_title.clone(),
        lang: config.lang,
        cell_width: session.view().cell_width,
        total_width: layout.total_width(),
        summary: session.summary(today),
        months,
        rows,
    }
}
