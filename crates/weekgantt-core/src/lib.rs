//! # weekgantt-core
//!
//! Core domain model for the weekgantt scheduling engine.
//!
//! This crate provides:
//! - Domain types: `Task`, `TaskKind`, `Locale`, `ProjectConfig`
//! - The week/month timeline generator ([`timeline`])
//! - The numbering/grouping/color pass ([`numbering`])
//! - A bounded undo/redo history ([`history`])
//! - The group-collapse display filter ([`visibility`])
//! - The persisted project document ([`document`])
//! - Dashboard summaries ([`status`])
//!
//! ## Example
//!
//! ```rust
//! use weekgantt_core::{numbering::renumber, Task};
//!
//! let tasks = renumber(&[
//!     Task::new("design").name_en("Design"),
//!     Task::new("wireframes").level(1),
//!     Task::new("build"),
//! ]);
//!
//! assert_eq!(tasks[1].no, "0.1");
//! assert_eq!(tasks[2].group, 1);
//! ```

pub mod document;
pub mod history;
pub mod numbering;
pub mod status;
pub mod timeline;
pub mod visibility;

mod lenient;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use lenient::{parse_duration_input, parse_progress_input, parse_week_input};

// ============================================================================
// Constants
// ============================================================================

/// Undated leading columns that let items start before week 0
pub const PADDING_COLUMNS: usize = 2;

/// Maximum number of undo snapshots kept by the editor
pub const MAX_HISTORY: usize = 50;

/// Display number reported by every payment milestone
pub const PAYMENT_MARKER: &str = "💰";

/// Default colors for main tasks, indexed by `main_index % len`
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#4F46E5", "#059669", "#0891B2", "#D97706", "#7C3AED", "#DC2626", "#DB2777", "#EA580C",
];

/// Shortest and longest project span accepted by the timeline, in months
pub const MIN_DURATION_MONTHS: u32 = 1;
pub const MAX_DURATION_MONTHS: u32 = 36;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a task or payment
pub type TaskId = String;

// ============================================================================
// Locale
// ============================================================================

/// Supported display languages
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Vi,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Vi => "vi",
            Locale::En => "en",
        }
    }

    /// The other supported language
    pub fn toggled(self) -> Self {
        match self {
            Locale::Vi => Locale::En,
            Locale::En => Locale::Vi,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vi" => Ok(Locale::Vi),
            "en" => Ok(Locale::En),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

// ============================================================================
// Task
// ============================================================================

/// Kind of a schedule row
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// A bar spanning one or more weeks
    #[default]
    Task,
    /// A zero-width payment milestone
    Payment,
}

impl TaskKind {
    /// Prefix used when allocating ids for new items of this kind
    pub fn id_prefix(&self) -> &'static str {
        match self {
            TaskKind::Task => "t",
            TaskKind::Payment => "p",
        }
    }
}

/// A row of the schedule
///
/// `no`, `group` and `display_color` are derived by
/// [`numbering::renumber`] and are never read back from persisted data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identifier, unique within the list
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: TaskId,
    #[serde(rename = "type", default, deserialize_with = "lenient::kind")]
    pub kind: TaskKind,
    /// 0 for main tasks, greater for sub-items of the preceding main task
    #[serde(default, deserialize_with = "lenient::level")]
    pub level: u32,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name_vi: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name_en: String,
    /// Week offset from the timeline origin; negative values sit in the padding
    #[serde(default, deserialize_with = "lenient::week")]
    pub start_week: i32,
    /// Length in weeks (tasks only)
    #[serde(
        default,
        deserialize_with = "lenient::duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<u32>,
    /// Completion percentage, 0..=100
    #[serde(default, deserialize_with = "lenient::progress")]
    pub progress: u8,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub is_onsite: bool,
    /// Explicit color override (`#RRGGBB`)
    #[serde(
        default,
        deserialize_with = "lenient::color",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,

    /// Display number ("0", "0.1", or the payment marker)
    #[serde(skip_deserializing)]
    pub no: String,
    /// Ordinal of the governing main task
    #[serde(skip_deserializing)]
    pub group: usize,
    /// Color after inheritance and palette defaults
    #[serde(skip_deserializing)]
    pub display_color: String,
}

impl Task {
    /// Create a main task with the given id and default fields
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: TaskKind::Task,
            level: 0,
            name_vi: String::new(),
            name_en: String::new(),
            start_week: 0,
            duration: Some(1),
            progress: 0,
            is_onsite: false,
            color: None,
            no: String::new(),
            group: 0,
            display_color: String::new(),
        }
    }

    /// Create a payment milestone with the given id
    pub fn payment(id: impl Into<String>) -> Self {
        Self {
            kind: TaskKind::Payment,
            duration: None,
            ..Self::new(id)
        }
    }

    /// Set the English name
    pub fn name_en(mut self, name: impl Into<String>) -> Self {
        self.name_en = name.into();
        self
    }

    /// Set the Vietnamese name
    pub fn name_vi(mut self, name: impl Into<String>) -> Self {
        self.name_vi = name.into();
        self
    }

    /// Set the nesting level
    pub fn level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Set the start week
    pub fn start_week(mut self, week: i32) -> Self {
        self.start_week = week;
        self
    }

    /// Set the duration in weeks (ignored for payments)
    pub fn duration(mut self, weeks: u32) -> Self {
        if self.kind == TaskKind::Task {
            self.duration = Some(weeks.max(1));
        }
        self
    }

    /// Set the completion percentage
    pub fn progress(mut self, percent: u8) -> Self {
        self.progress = percent.min(100);
        self
    }

    /// Mark the task as performed on site
    pub fn onsite(mut self, onsite: bool) -> Self {
        self.is_onsite = onsite;
        self
    }

    /// Set an explicit color override
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn is_payment(&self) -> bool {
        self.kind == TaskKind::Payment
    }

    /// Level-0 task (payments never govern a group)
    pub fn is_main(&self) -> bool {
        self.kind == TaskKind::Task && self.level == 0
    }

    pub fn is_sub_item(&self) -> bool {
        self.kind == TaskKind::Task && self.level > 0
    }

    /// Name in the requested locale
    pub fn name(&self, locale: Locale) -> &str {
        match locale {
            Locale::Vi => &self.name_vi,
            Locale::En => &self.name_en,
        }
    }

    pub fn set_name(&mut self, locale: Locale, name: impl Into<String>) {
        match locale {
            Locale::Vi => self.name_vi = name.into(),
            Locale::En => self.name_en = name.into(),
        }
    }

    /// Duration in weeks, treating payments and missing values as one week
    pub fn weeks(&self) -> u32 {
        self.duration.unwrap_or(1).max(1)
    }
}

/// Whether `value` is a `#RRGGBB` hex color
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

// ============================================================================
// Identifiers
// ============================================================================

/// Hands out task ids that are never reused within a session
///
/// Ids have the form `{prefix}_{n}` with a strictly increasing `n`. Seeding
/// from an existing list starts past the largest numeric suffix already in
/// use, so allocated ids cannot collide with loaded ones. Suffixes are read
/// as `u64` while the counter is wider, so even `u64::MAX` has a successor.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u128,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Start numbering after every id already present in `tasks`
    pub fn seeded_from(tasks: &[Task]) -> Self {
        let highest = tasks
            .iter()
            .filter_map(|t| t.id.rsplit_once('_'))
            .filter_map(|(_, suffix)| suffix.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            next: u128::from(highest) + 1,
        }
    }

    /// Move past every id in `tasks` without ever moving backwards
    pub fn observe(&mut self, tasks: &[Task]) {
        self.next = self.next.max(Self::seeded_from(tasks).next);
    }

    /// Allocate the next id with the given prefix
    pub fn allocate(&mut self, prefix: &str) -> TaskId {
        let n = self.next.max(1);
        self.next = n.saturating_add(1);
        format!("{prefix}_{n}")
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Project-level settings that drive timeline generation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// First day of the schedule
    pub start_date: NaiveDate,
    /// Span of the timeline in calendar months
    pub duration_months: u32,
    /// Display language
    pub lang: Locale,
    /// User-facing project title (empty means "use the default title")
    pub project_title: String,
}

impl ProjectConfig {
    /// Default project start used when none is given
    pub fn default_start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).expect("constant date is valid")
    }

    pub const DEFAULT_DURATION_MONTHS: u32 = 9;

    /// Set the start date
    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    /// Set the duration, clamped to the supported month range
    pub fn duration_months(mut self, months: u32) -> Self {
        self.duration_months = clamp_duration_months(months);
        self
    }

    /// Set the display language
    pub fn lang(mut self, lang: Locale) -> Self {
        self.lang = lang;
        self
    }

    /// Set the project title
    pub fn project_title(mut self, title: impl Into<String>) -> Self {
        self.project_title = title.into();
        self
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            start_date: Self::default_start_date(),
            duration_months: Self::DEFAULT_DURATION_MONTHS,
            lang: Locale::default(),
            project_title: String::new(),
        }
    }
}

/// Clamp a month count into `MIN_DURATION_MONTHS..=MAX_DURATION_MONTHS`
pub fn clamp_duration_months(months: u32) -> u32 {
    months.clamp(MIN_DURATION_MONTHS, MAX_DURATION_MONTHS)
}

// ============================================================================
// Errors
// ============================================================================

/// Unrecognised language tag
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown locale: {0}")]
pub struct UnknownLocale(pub String);

/// Persisted document error
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Document root must be a JSON object")]
    NotAnObject,

    #[error("Failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_builder() {
        let task = Task::new("impl")
            .name_en("Implementation")
            .name_vi("Triển khai")
            .level(1)
            .start_week(-1)
            .duration(3)
            .progress(150)
            .onsite(true);

        assert_eq!(task.id, "impl");
        assert_eq!(task.name(Locale::En), "Implementation");
        assert_eq!(task.name(Locale::Vi), "Triển khai");
        assert_eq!(task.start_week, -1);
        assert_eq!(task.duration, Some(3));
        assert_eq!(task.progress, 100);
        assert!(task.is_onsite);
        assert!(task.is_sub_item());
    }

    #[test]
    fn payment_has_no_duration() {
        let pay = Task::payment("p_1").duration(4);
        assert!(pay.is_payment());
        assert!(!pay.is_main());
        assert_eq!(pay.duration, None);
        assert_eq!(pay.weeks(), 1);
    }

    #[test]
    fn zero_duration_is_raised_to_one() {
        assert_eq!(Task::new("a").duration(0).duration, Some(1));
    }

    #[test]
    fn locale_parse_and_toggle() {
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
        assert_eq!(" vi ".parse::<Locale>(), Ok(Locale::Vi));
        assert!("fr".parse::<Locale>().is_err());
        assert_eq!(Locale::Vi.toggled(), Locale::En);
    }

    #[test]
    fn id_allocator_never_reuses() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate("t");
        let b = ids.allocate("t");
        let c = ids.allocate("p");
        assert_eq!(a, "t_1");
        assert_eq!(b, "t_2");
        assert_eq!(c, "p_3");
    }

    #[test]
    fn id_allocator_seeds_past_existing() {
        let tasks = vec![
            Task::new("t_17"),
            Task::new("sub_4"),
            Task::new("design"),
            Task::new("p_x"),
        ];
        let mut ids = IdAllocator::seeded_from(&tasks);
        assert_eq!(ids.allocate("sub"), "sub_18");
    }

    #[test]
    fn id_allocator_observe_only_moves_forward() {
        let mut ids = IdAllocator::seeded_from(&[Task::new("t_30")]);
        ids.observe(&[Task::new("t_2")]);
        assert_eq!(ids.allocate("t"), "t_31");
        ids.observe(&[Task::new("p_90")]);
        assert_eq!(ids.allocate("t"), "t_91");
    }

    #[test]
    fn id_allocator_steps_past_the_largest_suffix() {
        let mut ids = IdAllocator::seeded_from(&[Task::new("t_18446744073709551615")]);
        assert_eq!(ids.allocate("t"), "t_18446744073709551616");
        assert_eq!(ids.allocate("p"), "p_18446744073709551617");
    }

    #[test]
    fn hex_color_check() {
        assert!(is_hex_color("#4F46E5"));
        assert!(is_hex_color("#abcdef"));
        assert!(!is_hex_color("4F46E5"));
        assert!(!is_hex_color("#4F46E"));
        assert!(!is_hex_color("#GGGGGG"));
    }

    #[test]
    fn config_clamps_duration() {
        let config = ProjectConfig::default().duration_months(0);
        assert_eq!(config.duration_months, 1);
        let config = ProjectConfig::default().duration_months(99);
        assert_eq!(config.duration_months, 36);
    }

    #[test]
    fn config_defaults() {
        let config = ProjectConfig::default();
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert_eq!(config.duration_months, 9);
        assert_eq!(config.lang, Locale::Vi);
        assert!(config.project_title.is_empty());
    }
}
