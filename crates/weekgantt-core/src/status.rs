//! Project dashboard summary
//!
//! Answers "how big is this plan?" at a glance: timeline length, payment
//! milestones and the number of sub-items.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use weekgantt_core::status::ProjectSummary;
//! use weekgantt_core::timeline::generate_timeline;
//! use weekgantt_core::{Locale, Task};
//!
//! let timeline = generate_timeline(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(), 1, Locale::En);
//! let tasks = vec![
//!     Task::new("t_1"),
//!     Task::new("sub_2").level(1),
//!     Task::payment("p_3").name_en("Advance"),
//! ];
//! let today = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();
//!
//! let summary = ProjectSummary::from_tasks(&tasks, &timeline, Locale::En, today);
//! assert_eq!(summary.total_weeks, 4);
//! assert_eq!(summary.payment_count, 1);
//! assert_eq!(summary.sub_task_count, 1);
//! assert_eq!(summary.payments, vec!["Advance".to_string()]);
//! assert_eq!(summary.today_index, Some(1));
//! ```

use chrono::NaiveDate;
use serde::Serialize;

use crate::timeline::Timeline;
use crate::{Locale, Task};

/// Aggregated figures for the dashboard cards
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// Dated weeks on the timeline
    pub total_weeks: usize,
    pub payment_count: usize,
    /// Task rows with `level > 0`
    pub sub_task_count: usize,
    /// Payment names in the display locale, in list order
    pub payments: Vec<String>,
    /// Week containing the reference day, if it is on the timeline
    pub today_index: Option<usize>,
}

impl ProjectSummary {
    pub fn from_tasks(tasks: &[Task], timeline: &Timeline, locale: Locale, today: NaiveDate) -> Self {
        let payments: Vec<String> = tasks
            .iter()
            .filter(|t| t.is_payment())
            .map(|t| t.name(locale).to_string())
            .collect();

        Self {
            total_weeks: timeline.total_weeks(),
            payment_count: payments.len(),
            sub_task_count: tasks.iter().filter(|t| t.is_sub_item()).count(),
            payments,
            today_index: timeline.today_index(today),
        }
    }
}

impl std::fmt::Display for ProjectSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} weeks, {} payments, {} sub-tasks",
            self.total_weeks, self.payment_count, self.sub_task_count
        )
    }
}
