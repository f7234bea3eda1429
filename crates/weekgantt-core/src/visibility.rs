//! Group-collapse display filter
//!
//! Collapsing a main task hides its sub-items from the display list only; the
//! stored task list and its numbering are untouched.

use std::collections::BTreeSet;

use crate::{Task, TaskId, TaskKind};

/// Rows to display given the ids of collapsed main tasks
///
/// Main tasks and payments are always kept. A sub-item is kept unless its
/// governing main task is collapsed.
pub fn visible_tasks<'a>(tasks: &'a [Task], collapsed: &BTreeSet<TaskId>) -> Vec<&'a Task> {
    let mut parent_collapsed = false;
    tasks
        .iter()
        .filter(|task| match task.kind {
            TaskKind::Task if task.level == 0 => {
                parent_collapsed = collapsed.contains(&task.id);
                true
            }
            TaskKind::Payment => true,
            TaskKind::Task => !parent_collapsed,
        })
        .collect()
}

/// Number of sub-items hidden under each collapsed main task
pub fn hidden_counts(tasks: &[Task], collapsed: &BTreeSet<TaskId>) -> Vec<(TaskId, usize)> {
    let mut counts: Vec<(TaskId, usize)> = Vec::new();
    let mut current: Option<usize> = None;
    for task in tasks {
        if task.is_main() {
            current = collapsed.contains(&task.id).then(|| {
                counts.push((task.id.clone(), 0));
                counts.len() - 1
            });
        } else if task.is_sub_item() {
            if let Some(slot) = current {
                counts[slot].1 += 1;
            }
        }
    }
    counts
}
