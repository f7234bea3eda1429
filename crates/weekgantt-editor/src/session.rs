//! Editing session
//!
//! [`EditorSession`] owns everything an editor front end mutates: the project
//! configuration, the undo history of the task list, the view state and the
//! active pointer gesture.
//!
//! Rules every operation follows:
//! - The task list only changes through a history commit, and every commit
//!   re-runs [`renumber`] over the whole list.
//! - Live gesture updates go to a preview copy outside the history. Releasing
//!   the pointer commits that preview once, so one gesture is one undo step.
//! - Any discrete edit, undo or redo cancels a running gesture and drops its
//!   preview first.
//! - Edits that reference an unknown id are no-ops and return `false`/`None`.

use chrono::NaiveDate;
use weekgantt_core::document::{Document, LoadedDocument};
use weekgantt_core::history::History;
use weekgantt_core::numbering::{recolor_group, renumber};
use weekgantt_core::status::ProjectSummary;
use weekgantt_core::timeline::Timeline;
use weekgantt_core::visibility::visible_tasks;
use weekgantt_core::{
    is_hex_color, parse_duration_input, parse_progress_input, parse_week_input, IdAllocator,
    Locale, ProjectConfig, Task, TaskId, TaskKind,
};

use crate::interaction::InteractionController;
use crate::layout::{LayoutMapper, PointerTarget};
use crate::{InteractionError, ViewState};

// ============================================================================
// Single-field edits
// ============================================================================

/// One field of one task, as typed into the task table
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskEdit {
    Name(Locale, String),
    StartWeek(i32),
    /// Ignored for payments
    Duration(u32),
    /// Ignored for payments
    Progress(u8),
    /// Ignored for payments
    Onsite(bool),
    Level(u32),
    /// `None` clears the override so the row inherits again
    Color(Option<String>),
}

impl TaskEdit {
    /// Build an edit from a persisted field name and raw user text
    ///
    /// Numbers that do not parse fall back to safe values instead of being
    /// rejected. Returns `None` for an unknown field name.
    pub fn parse(field: &str, raw: &str) -> Option<Self> {
        let edit = match field {
            "nameVi" => TaskEdit::Name(Locale::Vi, raw.to_string()),
            "nameEn" => TaskEdit::Name(Locale::En, raw.to_string()),
            "startWeek" => TaskEdit::StartWeek(parse_week_input(raw)),
            "duration" => TaskEdit::Duration(parse_duration_input(raw)),
            "progress" => TaskEdit::Progress(parse_progress_input(raw)),
            "isOnsite" => {
                let raw = raw.trim();
                TaskEdit::Onsite(raw.eq_ignore_ascii_case("true") || raw == "1")
            }
            "level" => TaskEdit::Level(parse_week_input(raw).max(0) as u32),
            "color" => {
                let raw = raw.trim();
                TaskEdit::Color(is_hex_color(raw).then(|| raw.to_string()))
            }
            _ => return None,
        };
        Some(edit)
    }

    /// Write the edit into `task`; returns whether anything changed
    fn apply(&self, task: &mut Task) -> bool {
        let before = task.clone();
        match self {
            TaskEdit::Name(locale, name) => task.set_name(*locale, name.clone()),
            TaskEdit::StartWeek(week) => task.start_week = *week,
            TaskEdit::Level(level) => task.level = *level,
            TaskEdit::Color(color) => task.color = color.clone(),
            TaskEdit::Duration(_) | TaskEdit::Progress(_) | TaskEdit::Onsite(_)
                if task.is_payment() => {}
            TaskEdit::Duration(weeks) => task.duration = Some((*weeks).max(1)),
            TaskEdit::Progress(percent) => task.progress = (*percent).min(100),
            TaskEdit::Onsite(onsite) => task.is_onsite = *onsite,
        }
        *task != before
    }
}

// ============================================================================
// Session
// ============================================================================

/// A project open for editing
#[derive(Clone, Debug)]
pub struct EditorSession {
    config: ProjectConfig,
    timeline: Timeline,
    history: History<Vec<Task>>,
    view: ViewState,
    ids: IdAllocator,
    controller: InteractionController,
    preview: Option<Vec<Task>>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(ProjectConfig::default(), Vec::new())
    }
}

impl EditorSession {
    /// Open `tasks` under `config`; the initial list is not an undo step
    pub fn new(config: ProjectConfig, tasks: Vec<Task>) -> Self {
        let tasks = renumber(&tasks);
        Self {
            timeline: Timeline::from_config(&config),
            config,
            ids: IdAllocator::seeded_from(&tasks),
            history: History::new(tasks),
            view: ViewState::default(),
            controller: InteractionController::new(weekgantt_core::PADDING_COLUMNS),
            preview: None,
        }
    }

    /// Replace the initial view state
    pub fn with_view(mut self, view: ViewState) -> Self {
        self.view = view;
        self.prune_collapsed_months();
        self
    }
}

// ============================================================================
// Views
// ============================================================================

impl EditorSession {
    /// Current tasks, including any uncommitted gesture preview
    pub fn tasks(&self) -> &[Task] {
        self.preview
            .as_deref()
            .unwrap_or_else(|| self.history.present().as_slice())
    }

    /// Tasks as of the last commit
    pub fn committed_tasks(&self) -> &[Task] {
        self.history.present()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks().iter().find(|t| t.id == id)
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Geometry for the current timeline, zoom and collapsed months
    pub fn layout(&self) -> LayoutMapper {
        LayoutMapper::new(&self.timeline, &self.view.collapsed_months, self.view.cell_width)
    }

    /// Rows to display after group collapse
    pub fn visible_rows(&self) -> Vec<&Task> {
        visible_tasks(self.tasks(), &self.view.collapsed_groups)
    }

    pub fn summary(&self, today: NaiveDate) -> ProjectSummary {
        ProjectSummary::from_tasks(self.tasks(), &self.timeline, self.config.lang, today)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    /// Snapshot for saving
    pub fn to_document(&self) -> Document {
        Document::new(self.config.clone(), self.history.present().clone())
    }
}

// ============================================================================
// Configuration
// ============================================================================

impl EditorSession {
    pub fn set_start_date(&mut self, date: NaiveDate) {
        self.config.start_date = date;
        self.rebuild_timeline();
    }

    /// Change the span of the timeline, clamped to the supported range
    pub fn set_duration_months(&mut self, months: u32) {
        self.config = self.config.clone().duration_months(months);
        self.rebuild_timeline();
    }

    pub fn set_lang(&mut self, lang: Locale) {
        self.config.lang = lang;
        self.rebuild_timeline();
    }

    pub fn toggle_lang(&mut self) {
        self.set_lang(self.config.lang.toggled());
    }

    pub fn set_project_title(&mut self, title: impl Into<String>) {
        self.config.project_title = title.into();
    }

    fn rebuild_timeline(&mut self) {
        self.timeline = Timeline::from_config(&self.config);
        self.prune_collapsed_months();
        tracing::debug!(
            weeks = self.timeline.total_weeks(),
            months = self.timeline.months.len(),
            "timeline rebuilt"
        );
    }

    fn prune_collapsed_months(&mut self) {
        let months = self.timeline.months.len();
        self.view.collapsed_months.retain(|m| *m < months);
    }
}

// ============================================================================
// Task Operations
// ============================================================================

impl EditorSession {
    /// Append a two-week main task at week 0
    pub fn add_task(&mut self) -> TaskId {
        let id = self.ids.allocate(TaskKind::Task.id_prefix());
        let task = Task::new(id.clone())
            .name_vi("Công việc mới")
            .name_en("New Task")
            .duration(2);
        self.commit_with("add task", |tasks| {
            let mut tasks = tasks.to_vec();
            tasks.push(task);
            tasks
        });
        id
    }

    /// Append a payment milestone at week 0
    pub fn add_payment(&mut self) -> TaskId {
        let id = self.ids.allocate(TaskKind::Payment.id_prefix());
        let payment = Task::payment(id.clone())
            .name_vi("Thanh toán mới")
            .name_en("New Payment");
        self.commit_with("add payment", |tasks| {
            let mut tasks = tasks.to_vec();
            tasks.push(payment);
            tasks
        });
        id
    }

    /// Insert a one-week sub-item after the sub-items already under `parent_id`
    pub fn add_sub(&mut self, parent_id: &str) -> Option<TaskId> {
        self.settle();
        let tasks = self.history.present();
        let Some(parent_index) = tasks.iter().position(|t| t.id == parent_id) else {
            tracing::debug!(parent = parent_id, "add sub-item: unknown parent");
            return None;
        };
        let insert_at = tasks[parent_index + 1..]
            .iter()
            .position(|t| t.level == 0)
            .map_or(tasks.len(), |offset| parent_index + 1 + offset);

        let id = self.ids.allocate("sub");
        let sub = Task::new(id.clone())
            .name_vi("Mục con mới")
            .name_en("New Sub-item")
            .level(1)
            .start_week(tasks[parent_index].start_week);

        let mut next = tasks.clone();
        next.insert(insert_at, sub);
        self.commit("add sub-item", next);
        Some(id)
    }

    /// Remove a task; returns `false` if it does not exist
    pub fn delete(&mut self, id: &str) -> bool {
        self.settle();
        let tasks = self.history.present();
        if !tasks.iter().any(|t| t.id == id) {
            return false;
        }
        let next: Vec<Task> = tasks.iter().filter(|t| t.id != id).cloned().collect();
        self.view.forget(id);
        self.commit("delete", next)
    }

    /// Apply a single-field edit; returns whether a commit happened
    pub fn update(&mut self, id: &str, edit: &TaskEdit) -> bool {
        self.settle();
        let mut next = self.history.present().clone();
        let Some(task) = next.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if !edit.apply(task) {
            return false;
        }
        self.commit("update", next)
    }

    /// Recolor the whole group governed by the main task of `id`
    ///
    /// Sub-items lose their own overrides and inherit the new color.
    /// Returns `false` for an unknown id, a payment or an invalid color.
    pub fn change_group_color(&mut self, id: &str, color: &str) -> bool {
        self.settle();
        if !is_hex_color(color) {
            tracing::warn!(color, "ignoring invalid group color");
            return false;
        }
        match recolor_group(self.history.present(), id, color) {
            Some(next) => self.commit("group color", next),
            None => false,
        }
    }
}

// ============================================================================
// Selection and Batch Edits
// ============================================================================

impl EditorSession {
    /// Returns whether `id` is selected afterwards
    pub fn toggle_select(&mut self, id: &str) -> bool {
        self.view.toggle_select(id)
    }

    pub fn select_all(&mut self) {
        self.view.selected = self.tasks().iter().map(|t| t.id.clone()).collect();
    }

    pub fn deselect_all(&mut self) {
        self.view.selected.clear();
    }

    /// Give every selected task (not payment) an explicit color
    pub fn batch_color(&mut self, color: &str) -> bool {
        self.settle();
        if !is_hex_color(color) {
            tracing::warn!(color, "ignoring invalid batch color");
            return false;
        }
        let next = self
            .history
            .present()
            .iter()
            .map(|t| {
                let mut t = t.clone();
                if !t.is_payment() && self.view.selected.contains(&t.id) {
                    t.color = Some(color.to_string());
                }
                t
            })
            .collect();
        self.commit("batch color", next)
    }

    /// Shift every selected item by `delta` weeks, stopping at the padding
    pub fn batch_move(&mut self, delta: i32) -> bool {
        self.settle();
        let floor = -(self.timeline.padding_columns as i32);
        let next = self
            .history
            .present()
            .iter()
            .map(|t| {
                let mut t = t.clone();
                if self.view.selected.contains(&t.id) {
                    t.start_week = t.start_week.saturating_add(delta).max(floor);
                }
                t
            })
            .collect();
        self.commit("batch move", next)
    }

    /// Delete every selected item and clear the selection; returns how many went
    pub fn batch_delete(&mut self) -> usize {
        self.settle();
        let before = self.history.present().len();
        let next: Vec<Task> = self
            .history
            .present()
            .iter()
            .filter(|t| !self.view.selected.contains(&t.id))
            .cloned()
            .collect();
        let removed = before - next.len();
        let selected = std::mem::take(&mut self.view.selected);
        for id in &selected {
            self.view.collapsed_groups.remove(id);
        }
        self.commit("batch delete", next);
        removed
    }
}

// ============================================================================
// View Toggles and Zoom
// ============================================================================

impl EditorSession {
    /// Returns whether the month is collapsed afterwards; unknown months are ignored
    pub fn toggle_month(&mut self, month: usize) -> bool {
        if month >= self.timeline.months.len() {
            return false;
        }
        self.view.toggle_month(month)
    }

    /// Returns whether the group is collapsed afterwards
    pub fn toggle_group(&mut self, id: &str) -> bool {
        self.view.toggle_group(id)
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.view.reset_zoom();
    }

    /// Fit every week into `available` pixels
    pub fn fit_to_width(&mut self, available: f64) {
        self.view.fit_to_width(available, self.timeline.total_weeks());
    }
}

// ============================================================================
// History
// ============================================================================

impl EditorSession {
    pub fn undo(&mut self) -> bool {
        self.settle();
        let moved = self.history.undo();
        tracing::debug!(moved, depth = self.history.undo_depth(), "undo");
        moved
    }

    pub fn redo(&mut self) -> bool {
        self.settle();
        let moved = self.history.redo();
        tracing::debug!(moved, depth = self.history.redo_depth(), "redo");
        moved
    }

    /// Apply a loaded document: config replaces the current one and, if the
    /// document has tasks, they are committed as one undo step
    pub fn load_document(&mut self, loaded: LoadedDocument) {
        self.settle();
        self.config = loaded.config;
        self.rebuild_timeline();
        if let Some(tasks) = loaded.tasks {
            self.ids.observe(&tasks);
            let ids: std::collections::HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
            self.view.selected.retain(|id| ids.contains(id.as_str()));
            self.view.collapsed_groups.retain(|id| ids.contains(id.as_str()));
            self.commit("load document", tasks);
        }
    }

    /// Renumber and commit unless nothing changed
    fn commit(&mut self, action: &str, tasks: Vec<Task>) -> bool {
        let tasks = renumber(&tasks);
        if tasks == *self.history.present() {
            tracing::debug!(action, "no change, nothing committed");
            return false;
        }
        self.history.commit(tasks);
        tracing::debug!(action, depth = self.history.undo_depth(), "committed");
        true
    }

    fn commit_with(&mut self, action: &str, update: impl FnOnce(&[Task]) -> Vec<Task>) -> bool {
        self.settle();
        let next = update(self.history.present().as_slice());
        self.commit(action, next)
    }

    /// Cancel any running gesture and drop its preview
    fn settle(&mut self) {
        if self.controller.cancel().is_some() {
            tracing::debug!("gesture cancelled by a discrete edit");
        }
        self.preview = None;
    }
}

// ============================================================================
// Pointer Gestures
// ============================================================================

impl EditorSession {
    /// Press on task `id` at `x`
    ///
    /// Starts the gesture for whatever part of the task is under the pointer
    /// and returns it, or `Ok(None)` if `x` misses the task.
    pub fn pointer_down(
        &mut self,
        id: &str,
        x: f64,
    ) -> Result<Option<PointerTarget>, InteractionError> {
        if self.controller.is_active() {
            return Err(InteractionError::GestureInProgress);
        }
        let layout = self.layout();
        let task = self
            .history
            .present()
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| InteractionError::TaskNotFound(id.to_string()))?;
        let Some(target) = layout.hit_test(task, x) else {
            return Ok(None);
        };
        self.controller
            .pointer_down(task, target, x, layout.bar_geometry(task))?;
        Ok(Some(target))
    }

    /// Start a gesture explicitly, bypassing hit-testing
    pub fn begin_gesture(
        &mut self,
        id: &str,
        target: PointerTarget,
        x: f64,
    ) -> Result<(), InteractionError> {
        let layout = self.layout();
        let task = self
            .history
            .present()
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| InteractionError::TaskNotFound(id.to_string()))?;
        self.controller
            .pointer_down(task, target, x, layout.bar_geometry(task))
    }

    /// Update the preview for the pointer at `x`; returns whether it changed
    ///
    /// If the task was removed since the gesture began, the gesture is
    /// cancelled instead.
    pub fn pointer_move(&mut self, x: f64) -> bool {
        let cell_width = f64::from(self.view.cell_width);
        let Some(proposal) = self.controller.pointer_move(x, cell_width) else {
            return false;
        };
        if !self.history.present().iter().any(|t| t.id == proposal.task_id()) {
            tracing::debug!(task = proposal.task_id(), "gesture target vanished");
            self.settle();
            return false;
        }

        let preview = self
            .preview
            .get_or_insert_with(|| self.history.present().clone());
        preview
            .iter_mut()
            .find(|t| t.id == proposal.task_id())
            .is_some_and(|task| proposal.apply(task))
    }

    /// Release the pointer, committing the gesture as one undo step
    ///
    /// Returns whether a commit happened. Nothing is committed when the
    /// gesture ended where it started or its task is gone.
    pub fn pointer_up(&mut self) -> bool {
        let Ok(gesture) = self.controller.finish() else {
            return false;
        };
        let Some(preview) = self.preview.take() else {
            return false;
        };
        let exists = gesture
            .task_id()
            .is_some_and(|id| self.history.present().iter().any(|t| t.id == id));
        if !exists {
            tracing::debug!(task = ?gesture.task_id(), "gesture target vanished");
            return false;
        }
        self.commit("gesture", preview)
    }

    /// Abandon the current gesture, restoring the committed tasks
    pub fn cancel_gesture(&mut self) {
        self.settle();
    }

    pub fn gesture_active(&self) -> bool {
        self.controller.is_active()
    }
}
