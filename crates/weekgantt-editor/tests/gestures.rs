//! End-to-end editing through `EditorSession`: gestures, history and bounds

use pretty_assertions::assert_eq;
use weekgantt_core::{ProjectConfig, Task, MAX_HISTORY, PADDING_COLUMNS};
use weekgantt_editor::{EditorSession, PointerTarget, TaskEdit, ViewState};

fn session_with(tasks: Vec<Task>) -> EditorSession {
    EditorSession::new(ProjectConfig::default(), tasks)
}

fn cell(session: &EditorSession) -> f64 {
    f64::from(session.view().cell_width)
}

// =============================================================================
// Gestures
// =============================================================================

#[test]
fn drag_left_stops_at_the_padding() {
    let mut session = session_with(vec![Task::new("a").duration(2)]);
    let x = session.layout().x_for_week(0) + 4.0;
    session.pointer_down("a", x).unwrap();

    for dx in (1..=40).map(|n| -f64::from(n) * 25.0) {
        session.pointer_move(x + dx);
        assert!(session.task("a").unwrap().start_week >= -(PADDING_COLUMNS as i32));
    }
    assert!(session.pointer_up());
    assert_eq!(session.task("a").unwrap().start_week, -2);
}

#[test]
fn resize_grip_changes_duration_only() {
    let mut session = session_with(vec![Task::new("a").duration(2)]);
    let bar = session.layout().bar_geometry(session.task("a").unwrap());
    let x = bar.right() - 3.0;

    assert_eq!(session.pointer_down("a", x), Ok(Some(PointerTarget::ResizeHandle)));
    session.pointer_move(x - 10.0 * cell(&session));
    assert!(session.pointer_up());

    let task = session.task("a").unwrap();
    assert_eq!(task.duration, Some(1));
    assert_eq!(task.start_week, 0);

    session.undo();
    assert_eq!(session.task("a").unwrap().duration, Some(2));
}

#[test]
fn progress_grip_maps_within_the_bar() {
    let mut session = session_with(vec![Task::new("a").duration(2).progress(50)]);
    let bar = session.layout().bar_geometry(session.task("a").unwrap());
    let edge = bar.left + bar.width / 2.0;

    assert_eq!(session.pointer_down("a", edge), Ok(Some(PointerTarget::ProgressHandle)));
    session.pointer_move(bar.left + bar.width * 0.75);
    assert_eq!(session.task("a").unwrap().progress, 75);
    session.pointer_move(bar.right() + 500.0);
    assert_eq!(session.task("a").unwrap().progress, 100);
    assert!(session.pointer_up());
    assert_eq!(session.undo_depth(), 1);
}

#[test]
fn every_gesture_is_exactly_one_undo_step() {
    let mut session = session_with(vec![Task::new("a").duration(3), Task::new("b")]);
    let cw = cell(&session);

    for round in 1..=3 {
        let bar = session.layout().bar_geometry(session.task("a").unwrap());
        let x = bar.left + 2.0;
        session.pointer_down("a", x).unwrap();
        for step in 0..30 {
            session.pointer_move(x + f64::from(step) * cw / 10.0);
        }
        assert!(session.pointer_up());
        assert_eq!(session.undo_depth(), round);
    }
    assert_eq!(session.task("a").unwrap().start_week, 9);

    for expected in [6, 3, 0] {
        session.undo();
        assert_eq!(session.task("a").unwrap().start_week, expected);
    }
}

#[test]
fn deleting_the_dragged_task_cancels_the_gesture() {
    let mut session = session_with(vec![Task::new("a"), Task::new("b")]);
    let x = session.layout().x_for_week(0) + 4.0;
    session.pointer_down("a", x).unwrap();
    session.pointer_move(x + 100.0);

    session.delete("a");
    assert!(!session.pointer_up());
    assert!(!session.pointer_move(x + 200.0));
    assert_eq!(session.undo_depth(), 1);
    assert!(session.task("a").is_none());
}

#[test]
fn gestures_work_under_zoom_and_collapse() {
    let view = ViewState::default().with_cell_width(16);
    let mut session = session_with(vec![Task::new("a").start_week(1).duration(6)]).with_view(view);
    session.toggle_month(0);

    let layout = session.layout();
    let task = session.task("a").unwrap();
    // January is collapsed, so only weeks 4..7 of the bar are drawn
    assert_eq!(layout.bar_geometry(task).width, 3.0 * 16.0);

    let x = layout.bar_geometry(task).left + 1.0;
    session.pointer_down("a", x).unwrap();
    session.pointer_move(x + 32.0);
    session.pointer_up();
    assert_eq!(session.task("a").unwrap().start_week, 3);
    assert_eq!(session.task("a").unwrap().duration, Some(6));
}

// =============================================================================
// History
// =============================================================================

#[test]
fn undo_then_redo_round_trip() {
    let mut session = session_with(vec![Task::new("a")]);
    let original = session.tasks().to_vec();

    session.add_task();
    session.update("a", &TaskEdit::StartWeek(5));
    session.add_payment();
    session.change_group_color("a", "#101010");
    let head = session.tasks().to_vec();

    for _ in 0..4 {
        assert!(session.undo());
    }
    assert_eq!(session.tasks(), original.as_slice());
    assert!(!session.undo());

    for _ in 0..4 {
        assert!(session.redo());
    }
    assert_eq!(session.tasks(), head.as_slice());
    assert!(!session.redo());
}

#[test]
fn new_edit_after_undo_drops_redo() {
    let mut session = session_with(Vec::new());
    session.add_task();
    session.add_task();
    session.undo();
    assert!(session.can_redo());
    session.add_payment();
    assert!(!session.can_redo());
}

#[test]
fn history_keeps_only_the_newest_snapshots() {
    let mut session = session_with(Vec::new());
    let extra = 12;
    for _ in 0..MAX_HISTORY + extra {
        session.add_task();
    }
    assert_eq!(session.undo_depth(), MAX_HISTORY);

    let mut undone = 0;
    while session.undo() {
        undone += 1;
    }
    assert_eq!(undone, MAX_HISTORY);
    assert_eq!(session.tasks().len(), extra);
}
