//! Pointer gestures as explicit state machines
//!
//! Every gesture has the same shape: `Idle -> Active -> Idle`. Entering a
//! gesture records where the pointer went down and the value being edited.
//! Each pointer move then yields a [`Proposal`] computed from that origin,
//! never from the previous move, so rounding errors cannot accumulate.
//!
//! | Gesture  | Entered from          | Proposes                                   |
//! |----------|-----------------------|--------------------------------------------|
//! | Dragging | bar body              | `max(-padding, start + round(dx / cell))`  |
//! | Resizing | resize grip           | `max(1, duration + round(dx / cell))`      |
//! | Progress | progress grip         | `clamp(round((x - left) / width * 100))`   |
//!
//! Gestures are modal: while one is active every other `begin_*` call fails
//! with [`InteractionError::GestureInProgress`]. The controller never touches
//! task data itself; applying proposals and committing them is the caller's
//! job (see [`crate::session`]).

use weekgantt_core::{Task, TaskId, PADDING_COLUMNS};

use crate::layout::{BarGeometry, PointerTarget};
use crate::InteractionError;

/// Current gesture and the values captured when it started
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        task_id: TaskId,
        origin_x: f64,
        original_start: i32,
    },
    Resizing {
        task_id: TaskId,
        origin_x: f64,
        original_duration: u32,
    },
    Progress {
        task_id: TaskId,
        bar: BarGeometry,
        original_progress: u8,
    },
}

impl Gesture {
    /// Task being edited, if a gesture is active
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Gesture::Idle => None,
            Gesture::Dragging { task_id, .. }
            | Gesture::Resizing { task_id, .. }
            | Gesture::Progress { task_id, .. } => Some(task_id),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}

/// A single-field update produced by a pointer move
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Proposal {
    StartWeek { task_id: TaskId, start_week: i32 },
    Duration { task_id: TaskId, duration: u32 },
    Progress { task_id: TaskId, progress: u8 },
}

impl Proposal {
    pub fn task_id(&self) -> &str {
        match self {
            Proposal::StartWeek { task_id, .. }
            | Proposal::Duration { task_id, .. }
            | Proposal::Progress { task_id, .. } => task_id,
        }
    }

    /// Write the proposed value into `task`; returns whether it changed
    pub fn apply(&self, task: &mut Task) -> bool {
        match *self {
            Proposal::StartWeek { start_week, .. } => {
                let changed = task.start_week != start_week;
                task.start_week = start_week;
                changed
            }
            Proposal::Duration { duration, .. } => {
                let changed = task.duration != Some(duration);
                task.duration = Some(duration);
                changed
            }
            Proposal::Progress { progress, .. } => {
                let changed = task.progress != progress;
                task.progress = progress;
                changed
            }
        }
    }
}

/// Turns pointer positions into week, duration and progress proposals
#[derive(Clone, Debug)]
pub struct InteractionController {
    gesture: Gesture,
    padding_columns: i32,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(PADDING_COLUMNS)
    }
}

impl InteractionController {
    /// Controller whose drags stop `padding_columns` weeks before week 0
    pub fn new(padding_columns: usize) -> Self {
        Self {
            gesture: Gesture::Idle,
            padding_columns: i32::try_from(padding_columns).unwrap_or(i32::MAX),
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_active(&self) -> bool {
        !self.gesture.is_idle()
    }

    /// Start moving a task or payment
    pub fn begin_drag(&mut self, task: &Task, x: f64) -> Result<(), InteractionError> {
        self.ensure_idle()?;
        tracing::debug!(task = %task.id, start = task.start_week, "drag started");
        self.gesture = Gesture::Dragging {
            task_id: task.id.clone(),
            origin_x: x,
            original_start: task.start_week,
        };
        Ok(())
    }

    /// Start changing a task's duration
    pub fn begin_resize(&mut self, task: &Task, x: f64) -> Result<(), InteractionError> {
        self.ensure_idle()?;
        if task.is_payment() {
            return Err(InteractionError::NotResizable(task.id.clone()));
        }
        tracing::debug!(task = %task.id, duration = task.weeks(), "resize started");
        self.gesture = Gesture::Resizing {
            task_id: task.id.clone(),
            origin_x: x,
            original_duration: task.weeks(),
        };
        Ok(())
    }

    /// Start dragging the progress edge of a task drawn at `bar`
    pub fn begin_progress(&mut self, task: &Task, bar: BarGeometry) -> Result<(), InteractionError> {
        self.ensure_idle()?;
        if task.is_payment() {
            return Err(InteractionError::NotResizable(task.id.clone()));
        }
        tracing::debug!(task = %task.id, progress = task.progress, "progress drag started");
        self.gesture = Gesture::Progress {
            task_id: task.id.clone(),
            bar,
            original_progress: task.progress,
        };
        Ok(())
    }

    /// Start the gesture that belongs to the part of the task that was hit
    ///
    /// A press on the resize or progress grip starts only that gesture, never
    /// a drag as well.
    pub fn pointer_down(
        &mut self,
        task: &Task,
        target: PointerTarget,
        x: f64,
        bar: BarGeometry,
    ) -> Result<(), InteractionError> {
        match target {
            PointerTarget::Bar => self.begin_drag(task, x),
            PointerTarget::ResizeHandle => self.begin_resize(task, x),
            PointerTarget::ProgressHandle => self.begin_progress(task, bar),
        }
    }

    /// Proposal for the pointer at `x`; `None` while idle
    pub fn pointer_move(&self, x: f64, cell_width: f64) -> Option<Proposal> {
        let proposal = match &self.gesture {
            Gesture::Idle => return None,
            Gesture::Dragging {
                task_id,
                origin_x,
                original_start,
            } => {
                let delta = week_delta(x - origin_x, cell_width);
                Proposal::StartWeek {
                    task_id: task_id.clone(),
                    start_week: original_start.saturating_add(delta).max(-self.padding_columns),
                }
            }
            Gesture::Resizing {
                task_id,
                origin_x,
                original_duration,
            } => {
                let delta = i64::from(week_delta(x - origin_x, cell_width));
                let duration = (i64::from(*original_duration) + delta).clamp(1, i64::from(u32::MAX));
                Proposal::Duration {
                    task_id: task_id.clone(),
                    duration: duration as u32,
                }
            }
            Gesture::Progress {
                task_id,
                bar,
                original_progress,
            } => Proposal::Progress {
                task_id: task_id.clone(),
                progress: progress_at(x, bar).unwrap_or(*original_progress),
            },
        };
        tracing::trace!(?proposal, x, "pointer move");
        Some(proposal)
    }

    /// End the active gesture, returning it
    pub fn finish(&mut self) -> Result<Gesture, InteractionError> {
        if self.gesture.is_idle() {
            return Err(InteractionError::NoActiveGesture);
        }
        let ended = std::mem::take(&mut self.gesture);
        tracing::debug!(task = ?ended.task_id(), "gesture finished");
        Ok(ended)
    }

    /// Abandon the active gesture, if any
    pub fn cancel(&mut self) -> Option<Gesture> {
        if self.gesture.is_idle() {
            return None;
        }
        let ended = std::mem::take(&mut self.gesture);
        tracing::debug!(task = ?ended.task_id(), "gesture cancelled");
        Some(ended)
    }

    fn ensure_idle(&self) -> Result<(), InteractionError> {
        if self.gesture.is_idle() {
            Ok(())
        } else {
            Err(InteractionError::GestureInProgress)
        }
    }
}

/// Whole weeks covered by a horizontal pointer movement
///
/// Exact half cells round up, so a half-cell move left stays put while a
/// half-cell move right advances a week.
fn week_delta(dx: f64, cell_width: f64) -> i32 {
    if cell_width <= 0.0 || !dx.is_finite() {
        return 0;
    }
    let weeks = (dx / cell_width + 0.5).floor();
    weeks.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Percent of `bar` left of `x`, clamped to 0..=100
fn progress_at(x: f64, bar: &BarGeometry) -> Option<u8> {
    if bar.width <= 0.0 || !x.is_finite() {
        return None;
    }
    let percent = ((x - bar.left) / bar.width * 100.0).round();
    Some(percent.clamp(0.0, 100.0) as u8)
}
