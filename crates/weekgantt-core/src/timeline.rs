//! Week/month timeline generation
//!
//! A timeline is a leading run of undated padding columns followed by one
//! column per week, stepping 7 days from the project start until the first
//! day of the month `duration_months` after the start month. Weeks are then
//! grouped into months by the calendar month of their anchor day.
//!
//! Month boundaries are found by comparing each week with the *next* week, so
//! the first and last "months" may hold fewer weeks than a calendar month.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use weekgantt_core::{timeline::generate_timeline, Locale};
//!
//! let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
//! let timeline = generate_timeline(start, 2, Locale::En);
//!
//! assert_eq!(timeline.total_weeks(), 8);
//! assert_eq!(timeline.months[0].label, "Jan 2025");
//! assert_eq!(timeline.months[1].count, 4);
//! ```

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::{Locale, ProjectConfig, Task, PADDING_COLUMNS};

const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A dated timeline column
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    /// 0-based position among dated weeks
    pub index: usize,
    /// Anchor day of the week
    pub date: NaiveDate,
    /// Last week of its month (or of the whole timeline)
    pub is_month_end: bool,
}

/// A contiguous run of weeks sharing a calendar month
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Month {
    /// Display label in the timeline locale, e.g. "Jan 2025" or "Thg 1 2025"
    pub label: String,
    pub year: i32,
    /// Calendar month, 1-based
    pub month: u32,
    /// Index of the first member week
    pub first_week: usize,
    /// Number of member weeks
    pub count: usize,
}

impl Month {
    /// Week indices covered by this month
    pub fn weeks(&self) -> std::ops::Range<usize> {
        self.first_week..self.first_week + self.count
    }
}

/// A column of the timeline grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeekCell<'a> {
    /// Undated column before week 0
    Padding,
    /// A dated week
    Active(&'a Week),
}

/// Week and month structure derived from the project configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    /// Number of undated leading columns
    pub padding_columns: usize,
    /// Dated weeks in order
    pub weeks: Vec<Week>,
    /// Month partition of `weeks`
    pub months: Vec<Month>,
}

/// Build the timeline for a start date and a span in months
///
/// `duration_months` below 1 is treated as 1. The locale only changes month
/// labels.
pub fn generate_timeline(start: NaiveDate, duration_months: u32, locale: Locale) -> Timeline {
    let duration_months = duration_months.max(1);
    let month_start = start.with_day(1).unwrap_or(start);
    let end = month_start
        .checked_add_months(Months::new(duration_months))
        .unwrap_or(month_start);

    let mut dates = Vec::new();
    let mut cursor = start;
    while cursor < end {
        dates.push(cursor);
        match cursor.checked_add_days(Days::new(7)) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    let weeks: Vec<Week> = dates
        .iter()
        .enumerate()
        .map(|(index, date)| Week {
            index,
            date: *date,
            is_month_end: dates
                .get(index + 1)
                .map_or(true, |next| next.month() != date.month()),
        })
        .collect();

    let mut months: Vec<Month> = Vec::new();
    for week in &weeks {
        let key = (week.date.year(), week.date.month());
        match months.last_mut() {
            Some(current) if (current.year, current.month) == key => current.count += 1,
            _ => months.push(Month {
                label: month_label(key.0, key.1, locale),
                year: key.0,
                month: key.1,
                first_week: week.index,
                count: 1,
            }),
        }
    }

    Timeline {
        padding_columns: PADDING_COLUMNS,
        weeks,
        months,
    }
}

/// Month header label in the given locale
pub fn month_label(year: i32, month: u32, locale: Locale) -> String {
    match locale {
        Locale::En => {
            let name = MONTHS_EN
                .get(month.saturating_sub(1) as usize)
                .copied()
                .unwrap_or("?");
            format!("{name} {year}")
        }
        Locale::Vi => format!("Thg {month} {year}"),
    }
}

impl Timeline {
    /// Build the timeline described by a project configuration
    pub fn from_config(config: &ProjectConfig) -> Self {
        generate_timeline(config.start_date, config.duration_months, config.lang)
    }

    /// Number of dated weeks
    pub fn total_weeks(&self) -> usize {
        self.weeks.len()
    }

    /// Padding plus dated columns
    pub fn total_columns(&self) -> usize {
        self.padding_columns + self.weeks.len()
    }

    /// All columns in display order: padding first, then dated weeks
    pub fn cells(&self) -> impl Iterator<Item = WeekCell<'_>> + '_ {
        std::iter::repeat(WeekCell::Padding)
            .take(self.padding_columns)
            .chain(self.weeks.iter().map(WeekCell::Active))
    }

    /// Date of a week index; `None` for padding or out-of-range weeks
    pub fn week_date(&self, week: i32) -> Option<NaiveDate> {
        usize::try_from(week)
            .ok()
            .and_then(|i| self.weeks.get(i))
            .map(|w| w.date)
    }

    /// Month index that contains a week
    pub fn month_of_week(&self, week: usize) -> Option<usize> {
        self.months.iter().position(|m| m.weeks().contains(&week))
    }

    /// Month index for every dated week, in week order
    pub fn week_to_month(&self) -> Vec<usize> {
        let mut lookup = Vec::with_capacity(self.weeks.len());
        for (mi, month) in self.months.iter().enumerate() {
            lookup.extend(std::iter::repeat(mi).take(month.count));
        }
        lookup
    }

    /// Dates of the first and last week covered by a task
    ///
    /// Either end is `None` when it falls in the padding or past the end of
    /// the timeline. Payments cover a single week.
    pub fn task_dates(&self, task: &Task) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let span = i32::try_from(task.weeks()).unwrap_or(i32::MAX).saturating_sub(1);
        let last = task.start_week.saturating_add(span);
        (self.week_date(task.start_week), self.week_date(last))
    }

    /// Dated week containing `today`
    ///
    /// The last week is treated as lasting 7 days.
    pub fn today_index(&self, today: NaiveDate) -> Option<usize> {
        self.weeks.iter().enumerate().find_map(|(i, week)| {
            let next = self
                .weeks
                .get(i + 1)
                .map(|w| w.date)
                .or_else(|| week.date.checked_add_days(Days::new(7)))?;
            (week.date <= today && today < next).then_some(i)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn single_month_from_monday() {
        let tl = generate_timeline(date(2025, 1, 6), 1, Locale::En);
        let dates: Vec<_> = tl.weeks.iter().map(|w| w.date).collect();
        assert_eq!(
            dates,
            vec![date(2025, 1, 6), date(2025, 1, 13), date(2025, 1, 20), date(2025, 1, 27)]
        );
        assert_eq!(tl.months.len(), 1);
        assert_eq!(tl.months[0].count, 4);
        assert!(tl.weeks[3].is_month_end);
        assert!(!tl.weeks[2].is_month_end);
    }

    #[test]
    fn padding_is_constant() {
        for months in [1, 6, 36] {
            let tl = generate_timeline(date(2025, 3, 1), months, Locale::Vi);
            assert_eq!(tl.padding_columns, PADDING_COLUMNS);
            assert_eq!(tl.total_columns(), PADDING_COLUMNS + tl.total_weeks());
        }
    }

    #[test]
    fn month_end_flags_follow_next_week() {
        let tl = generate_timeline(date(2025, 1, 6), 2, Locale::En);
        let flags: Vec<_> = tl.weeks.iter().map(|w| w.is_month_end).collect();
        assert_eq!(flags, vec![false, false, false, true, false, false, false, true]);
        assert_eq!(tl.months[1].first_week, 4);
    }

    #[test]
    fn edge_months_can_be_short() {
        // Anchored on the 29th, January only keeps one week
        let tl = generate_timeline(date(2025, 1, 29), 2, Locale::En);
        let counts: Vec<_> = tl.months.iter().map(|m| m.count).collect();
        assert_eq!(counts, vec![1, 4]);
    }

    #[test]
    fn last_day_of_month_start_still_yields_a_week() {
        let tl = generate_timeline(date(2025, 1, 31), 1, Locale::En);
        assert_eq!(tl.total_weeks(), 1);
        assert_eq!(tl.months[0].label, "Jan 2025");
    }

    #[test]
    fn zero_months_treated_as_one() {
        let a = generate_timeline(date(2025, 1, 6), 0, Locale::En);
        let b = generate_timeline(date(2025, 1, 6), 1, Locale::En);
        assert_eq!(a, b);
    }

    #[test]
    fn year_rollover() {
        let tl = generate_timeline(date(2025, 12, 15), 2, Locale::En);
        let labels: Vec<_> = tl.months.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Dec 2025", "Jan 2026"]);
        assert_eq!(tl.weeks.last().unwrap().date, date(2026, 1, 26));
    }

    #[test]
    fn locale_changes_labels_only() {
        let en = generate_timeline(date(2025, 1, 6), 3, Locale::En);
        let vi = generate_timeline(date(2025, 1, 6), 3, Locale::Vi);
        assert_eq!(en.weeks, vi.weeks);
        assert_eq!(vi.months[0].label, "Thg 1 2025");
        assert_eq!(en.months[2].label, "Mar 2025");
    }

    #[test]
    fn cells_put_padding_first() {
        let tl = generate_timeline(date(2025, 1, 6), 1, Locale::En);
        let cells: Vec<_> = tl.cells().collect();
        assert_eq!(cells.len(), PADDING_COLUMNS + 4);
        assert_eq!(cells[0], WeekCell::Padding);
        assert_eq!(cells[1], WeekCell::Padding);
        assert_eq!(cells[2], WeekCell::Active(&tl.weeks[0]));
    }

    #[test]
    fn week_lookup_helpers() {
        let tl = generate_timeline(date(2025, 1, 6), 2, Locale::En);
        assert_eq!(tl.week_date(-1), None);
        assert_eq!(tl.week_date(4), Some(date(2025, 2, 3)));
        assert_eq!(tl.week_date(8), None);
        assert_eq!(tl.month_of_week(3), Some(0));
        assert_eq!(tl.month_of_week(4), Some(1));
        assert_eq!(tl.month_of_week(8), None);
        assert_eq!(tl.week_to_month(), vec![0, 0, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn task_date_span() {
        let tl = generate_timeline(date(2025, 1, 6), 2, Locale::En);
        let task = Task::new("a").start_week(1).duration(3);
        assert_eq!(tl.task_dates(&task), (Some(date(2025, 1, 13)), Some(date(2025, 1, 27))));

        let early = Task::new("b").start_week(-2).duration(3);
        assert_eq!(tl.task_dates(&early), (None, Some(date(2025, 1, 6))));

        let pay = Task::payment("p").start_week(5);
        assert_eq!(tl.task_dates(&pay), (Some(date(2025, 2, 10)), Some(date(2025, 2, 10))));

        let endless = Task::new("c").start_week(2).duration(u32::MAX);
        assert_eq!(tl.task_dates(&endless), (Some(date(2025, 1, 20)), None));
    }

    #[test]
    fn today_marker() {
        let tl = generate_timeline(date(2025, 1, 6), 2, Locale::En);
        assert_eq!(tl.today_index(date(2025, 1, 5)), None);
        assert_eq!(tl.today_index(date(2025, 1, 6)), Some(0));
        assert_eq!(tl.today_index(date(2025, 1, 12)), Some(0));
        assert_eq!(tl.today_index(date(2025, 3, 2)), Some(7));
        assert_eq!(tl.today_index(date(2025, 3, 3)), None);
    }
}
