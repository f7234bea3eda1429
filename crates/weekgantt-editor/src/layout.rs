//! Week/pixel geometry under zoom and month collapse
//!
//! A [`LayoutMapper`] is a snapshot of the geometry for one combination of
//! timeline, collapsed months and cell width. It is cheap to build and holds
//! no references, so callers rebuild it whenever any of the three change
//! instead of keeping one around.
//!
//! ```text
//!   padding        Jan (visible)        Feb (collapsed)   Mar (visible)
//! |-2 |-1 | 0 | 1 | 2 | 3 |  4..7 (0 px)  | 8 | 9 |10 |11 |12 |
//! ```
//!
//! Padding weeks are never collapsible and are placed linearly. A collapsed
//! week contributes no width, so a bar spanning a collapsed month shrinks on
//! screen while its `duration` stays the same.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use chrono::NaiveDate;
//! use weekgantt_core::{timeline::generate_timeline, Locale};
//! use weekgantt_editor::LayoutMapper;
//!
//! let timeline = generate_timeline(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(), 3, Locale::En);
//! let collapsed = BTreeSet::from([1]);
//! let layout = LayoutMapper::new(&timeline, &collapsed, 48);
//!
//! assert_eq!(layout.x_for_week(0), 96.0);
//! assert_eq!(layout.span_width(4, 4), 0.0);
//! ```

use std::collections::BTreeSet;

use weekgantt_core::timeline::Timeline;
use weekgantt_core::Task;

use crate::COLLAPSED_MONTH_WIDTH;

/// Width of the resize grip at the right end of a bar
pub const RESIZE_HANDLE_WIDTH: f64 = 10.0;

/// Width of the progress grip, centred on the progress edge
pub const PROGRESS_HANDLE_WIDTH: f64 = 12.0;

// ============================================================================
// Types
// ============================================================================

/// Horizontal extent of a task on screen
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarGeometry {
    pub left: f64,
    pub width: f64,
}

impl BarGeometry {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    fn contains(&self, x: f64) -> bool {
        x >= self.left && x < self.right()
    }
}

/// Part of a task a pointer landed on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerTarget {
    /// Body of a bar or a payment marker; starts a move
    Bar,
    /// Right-hand grip; starts a resize
    ResizeHandle,
    /// Grip on the progress edge; starts a progress drag
    ProgressHandle,
}

/// Pixel geometry for a timeline at one zoom level and collapse state
#[derive(Clone, Debug)]
pub struct LayoutMapper {
    cell_width: f64,
    padding_columns: usize,
    week_to_month: Vec<usize>,
    visible: Vec<bool>,
    offsets: Vec<f64>,
    visible_width: f64,
    month_widths: Vec<f64>,
}

// ============================================================================
// Construction
// ============================================================================

impl LayoutMapper {
    /// Compute geometry for `timeline` with the given collapsed month indices
    pub fn new(timeline: &Timeline, collapsed_months: &BTreeSet<usize>, cell_width: u32) -> Self {
        let cell_width = f64::from(cell_width);
        let week_to_month = timeline.week_to_month();

        let visible: Vec<bool> = week_to_month
            .iter()
            .map(|month| !collapsed_months.contains(month))
            .collect();

        let mut offsets = Vec::with_capacity(visible.len());
        let mut cursor = 0.0;
        for shown in &visible {
            offsets.push(cursor);
            if *shown {
                cursor += cell_width;
            }
        }

        let month_widths = timeline
            .months
            .iter()
            .enumerate()
            .map(|(i, month)| {
                if collapsed_months.contains(&i) {
                    COLLAPSED_MONTH_WIDTH
                } else {
                    month.count as f64 * cell_width
                }
            })
            .collect();

        Self {
            cell_width,
            padding_columns: timeline.padding_columns,
            week_to_month,
            visible,
            offsets,
            visible_width: cursor,
            month_widths,
        }
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn padding_columns(&self) -> usize {
        self.padding_columns
    }

    /// Width of the undated leading columns
    pub fn padding_width(&self) -> f64 {
        self.padding_columns as f64 * self.cell_width
    }
}

// ============================================================================
// Week <-> Pixel
// ============================================================================

impl LayoutMapper {
    /// Month index of a dated week
    pub fn month_of(&self, week: usize) -> Option<usize> {
        self.week_to_month.get(week).copied()
    }

    /// Whether a week occupies screen width
    ///
    /// Padding weeks and weeks past the end of the timeline have no month and
    /// are always visible.
    pub fn is_week_visible(&self, week: i32) -> bool {
        usize::try_from(week)
            .ok()
            .and_then(|w| self.visible.get(w))
            .copied()
            .unwrap_or(true)
    }

    /// Offset of a dated week from the end of the padding
    pub fn visible_offset(&self, week: usize) -> Option<f64> {
        self.offsets.get(week).copied()
    }

    /// Left edge of a week column, measured from the start of the padding
    ///
    /// Weeks past the end of the timeline continue linearly after the last
    /// visible column.
    pub fn x_for_week(&self, week: i32) -> f64 {
        let padding = self.padding_width();
        if week < 0 {
            return padding + f64::from(week) * self.cell_width;
        }
        let index = week as usize;
        match self.offsets.get(index) {
            Some(offset) => padding + offset,
            None => {
                let overflow = (index - self.offsets.len()) as f64;
                padding + self.visible_width + overflow * self.cell_width
            }
        }
    }

    /// On-screen width of the weeks `[start, start + duration)`
    ///
    /// Padding weeks always count, collapsed weeks count zero and weeks past
    /// the end of the timeline are not drawn.
    pub fn span_width(&self, start: i32, duration: u32) -> f64 {
        let start = i64::from(start);
        let end = start + i64::from(duration);
        let mut width = 0.0;
        for week in start..end {
            if week < 0 {
                width += self.cell_width;
                continue;
            }
            match self.visible.get(week as usize) {
                Some(true) => width += self.cell_width,
                Some(false) => {}
                None => break,
            }
        }
        width
    }

    /// Week under a pixel position, the inverse of [`Self::x_for_week`]
    ///
    /// Returns a negative week inside the padding, and `None` left of the
    /// grid or right of the last visible week.
    pub fn week_at(&self, x: f64) -> Option<i32> {
        if !x.is_finite() || x < 0.0 {
            return None;
        }
        let padding = self.padding_width();
        if x < padding {
            return Some(((x - padding) / self.cell_width).floor() as i32);
        }

        let rel = x - padding;
        if rel >= self.visible_width {
            return None;
        }
        // Last visible week whose column starts at or before `rel`
        let candidates = self.offsets.partition_point(|offset| *offset <= rel);
        (0..candidates)
            .rev()
            .find(|&week| self.visible[week])
            .map(|week| week as i32)
    }

    /// Number of dated weeks that occupy screen width
    pub fn visible_week_count(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }

    /// Width of a task row: padding plus every visible week
    pub fn total_width(&self) -> f64 {
        self.padding_width() + self.visible_width
    }

    /// Width of a month header; collapsed months render a narrow marker
    pub fn month_header_width(&self, month: usize) -> Option<f64> {
        self.month_widths.get(month).copied()
    }

    /// Width of the header row: padding plus every month header
    pub fn header_width(&self) -> f64 {
        self.padding_width() + self.month_widths.iter().sum::<f64>()
    }

    /// Centre of the "today" column, unless it is hidden or off the timeline
    pub fn today_x(&self, today_index: usize) -> Option<f64> {
        let offset = self.offsets.get(today_index)?;
        self.visible[today_index]
            .then(|| self.padding_width() + offset + self.cell_width / 2.0)
    }
}

// ============================================================================
// Task Geometry
// ============================================================================

impl LayoutMapper {
    /// Screen extent of a task bar or payment marker
    ///
    /// A payment occupies one column starting at its week.
    pub fn bar_geometry(&self, task: &Task) -> BarGeometry {
        let left = self.x_for_week(task.start_week);
        let width = if task.is_payment() {
            self.cell_width
        } else {
            self.span_width(task.start_week, task.weeks())
        };
        BarGeometry { left, width }
    }

    /// Which part of a task is under `x`, if any
    ///
    /// The resize grip wins over the progress grip where they overlap. Only
    /// tasks with progress above zero have a progress grip, and payments
    /// have neither.
    pub fn hit_test(&self, task: &Task, x: f64) -> Option<PointerTarget> {
        let bar = self.bar_geometry(task);
        if bar.width <= 0.0 {
            return None;
        }
        if task.is_payment() {
            return bar.contains(x).then_some(PointerTarget::Bar);
        }

        let right = bar.right();
        if bar.contains(x) && x >= right - RESIZE_HANDLE_WIDTH {
            return Some(PointerTarget::ResizeHandle);
        }
        if task.progress > 0 {
            let edge = bar.left + bar.width * f64::from(task.progress) / 100.0;
            let half = PROGRESS_HANDLE_WIDTH / 2.0;
            if x >= edge - half && x < edge + half {
                return Some(PointerTarget::ProgressHandle);
            }
        }
        bar.contains(x).then_some(PointerTarget::Bar)
    }
}
