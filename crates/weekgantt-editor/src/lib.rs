//! # weekgantt-editor
//!
//! Interactive editing layer on top of `weekgantt-core`.
//!
//! This crate provides:
//! - Week/pixel geometry under zoom and month collapse ([`layout`])
//! - Drag, resize and progress gestures as explicit state machines ([`interaction`])
//! - An editing session tying history, numbering, view state and gestures
//!   together ([`session`])
//!
//! ## Example
//!
//! ```rust
//! use weekgantt_editor::session::EditorSession;
//!
//! let mut session = EditorSession::default();
//! let id = session.add_task();
//!
//! // One pointer gesture becomes exactly one undo step
//! let x = session.layout().x_for_week(0) + 5.0;
//! session.pointer_down(&id, x).unwrap();
//! session.pointer_move(x + 2.0 * f64::from(session.view().cell_width));
//! session.pointer_up();
//!
//! assert_eq!(session.tasks()[0].start_week, 2);
//! session.undo();
//! assert_eq!(session.tasks()[0].start_week, 0);
//! ```

pub mod interaction;
pub mod layout;
pub mod session;

use std::collections::BTreeSet;

use thiserror::Error;
use weekgantt_core::TaskId;

pub use interaction::{Gesture, InteractionController, Proposal};
pub use layout::{BarGeometry, LayoutMapper, PointerTarget};
pub use session::{EditorSession, TaskEdit};

// ============================================================================
// Zoom
// ============================================================================

/// Smallest week column width, in pixels
pub const MIN_CELL_WIDTH: u32 = 16;

/// Largest week column width, in pixels
pub const MAX_CELL_WIDTH: u32 = 64;

/// Column width on a fresh session and after a zoom reset
pub const DEFAULT_CELL_WIDTH: u32 = 48;

/// Width change per zoom step
pub const ZOOM_STEP: u32 = 8;

/// Upper bound used by fit-to-width, which never zooms in past the default
pub const FIT_MAX_CELL_WIDTH: u32 = 48;

/// Rendered width of a collapsed month marker
pub const COLLAPSED_MONTH_WIDTH: f64 = 8.0;

// ============================================================================
// View State
// ============================================================================

/// Display-only state: zoom, collapse sets and selection
///
/// None of this is part of the undo history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    /// Width of one week column in pixels
    pub cell_width: u32,
    /// Month indices rendered as narrow markers
    pub collapsed_months: BTreeSet<usize>,
    /// Main task ids whose sub-items are hidden
    pub collapsed_groups: BTreeSet<TaskId>,
    /// Ids targeted by batch edits
    pub selected: BTreeSet<TaskId>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            cell_width: DEFAULT_CELL_WIDTH,
            collapsed_months: BTreeSet::new(),
            collapsed_groups: BTreeSet::new(),
            selected: BTreeSet::new(),
        }
    }
}

impl ViewState {
    /// Set the column width, clamped to the zoom range
    pub fn with_cell_width(mut self, width: u32) -> Self {
        self.cell_width = clamp_cell_width(width);
        self
    }

    pub fn zoom_in(&mut self) {
        self.cell_width = clamp_cell_width(self.cell_width.saturating_add(ZOOM_STEP));
    }

    pub fn zoom_out(&mut self) {
        self.cell_width = clamp_cell_width(self.cell_width.saturating_sub(ZOOM_STEP));
    }

    pub fn reset_zoom(&mut self) {
        self.cell_width = DEFAULT_CELL_WIDTH;
    }

    /// Pick the widest column that fits `total_weeks` into `available` pixels
    ///
    /// The result never goes below [`MIN_CELL_WIDTH`] or above
    /// [`FIT_MAX_CELL_WIDTH`].
    pub fn fit_to_width(&mut self, available: f64, total_weeks: usize) {
        if total_weeks == 0 {
            return;
        }
        let fitted = (available / total_weeks as f64).floor();
        self.cell_width = if fitted.is_finite() {
            fitted.clamp(f64::from(MIN_CELL_WIDTH), f64::from(FIT_MAX_CELL_WIDTH)) as u32
        } else {
            MIN_CELL_WIDTH
        };
    }

    /// Collapse or expand a month; returns whether it is now collapsed
    pub fn toggle_month(&mut self, month: usize) -> bool {
        toggle(&mut self.collapsed_months, month)
    }

    /// Collapse or expand a main task's group; returns whether it is now collapsed
    pub fn toggle_group(&mut self, id: &str) -> bool {
        toggle(&mut self.collapsed_groups, id.to_string())
    }

    /// Add or remove an id from the selection; returns whether it is now selected
    pub fn toggle_select(&mut self, id: &str) -> bool {
        toggle(&mut self.selected, id.to_string())
    }

    /// Drop every reference to a task that no longer exists
    pub(crate) fn forget(&mut self, id: &str) {
        self.selected.remove(id);
        self.collapsed_groups.remove(id);
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

/// Clamp a column width into `MIN_CELL_WIDTH..=MAX_CELL_WIDTH`
pub fn clamp_cell_width(width: u32) -> u32 {
    width.clamp(MIN_CELL_WIDTH, MAX_CELL_WIDTH)
}

// ============================================================================
// Errors
// ============================================================================

/// Rejected pointer gesture
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InteractionError {
    #[error("Another gesture is already in progress")]
    GestureInProgress,

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Payments cannot be resized: {0}")]
    NotResizable(TaskId),

    #[error("No gesture is in progress")]
    NoActiveGesture,
}

// ============================================================================
// Tests
// ============================================================================
