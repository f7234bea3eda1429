//! Numbering, grouping and color resolution
//!
//! [`renumber`] is a single left-to-right pass that re-derives `no`, `group`
//! and `display_color` for every row from scratch. Every structural edit runs
//! it over the whole list rather than patching the rows it touched.

use std::collections::HashMap;

use crate::{Task, TaskKind, DEFAULT_PALETTE, PAYMENT_MARKER};

/// Palette color for the main task at `main_index`
pub fn default_color(main_index: usize) -> &'static str {
    DEFAULT_PALETTE[main_index % DEFAULT_PALETTE.len()]
}

/// Re-derive display numbers, groups and colors
///
/// - Main tasks are numbered from 0 and get `group == number`.
/// - Sub-items are numbered `"{main}.{n}"`, with `n` restarting at 1 per group.
/// - Payments report [`PAYMENT_MARKER`] and the group of the last main task.
/// - Uncolored main tasks take a palette color; uncolored sub-items take the
///   resolved color of their main task.
///
/// Sub-items that appear before any main task are numbered `"-1.{n}"` and
/// placed in group 0.
pub fn renumber(tasks: &[Task]) -> Vec<Task> {
    let mut main_index: i64 = -1;
    let mut sub_counters: HashMap<i64, u32> = HashMap::new();
    let mut current_group = 0usize;
    let mut current_color = default_color(0).to_string();

    tasks
        .iter()
        .map(|task| {
            let mut task = task.clone();
            match task.kind {
                TaskKind::Payment => {
                    task.no = PAYMENT_MARKER.to_string();
                    task.group = current_group;
                    task.display_color = current_color.clone();
                }
                TaskKind::Task if task.level == 0 => {
                    main_index += 1;
                    current_group = main_index as usize;
                    sub_counters.insert(main_index, 0);
                    current_color = task
                        .color
                        .clone()
                        .unwrap_or_else(|| default_color(current_group).to_string());
                    task.no = main_index.to_string();
                    task.group = current_group;
                    task.display_color = current_color.clone();
                }
                TaskKind::Task => {
                    let counter = sub_counters.entry(main_index).or_insert(0);
                    *counter += 1;
                    task.no = format!("{main_index}.{counter}");
                    task.group = current_group;
                    task.display_color = task
                        .color
                        .clone()
                        .unwrap_or_else(|| current_color.clone());
                }
            }
            task
        })
        .collect()
}

/// Recolor the group governed by the main task of `task_id`
///
/// The main task gets `color` as its explicit override and explicit overrides
/// on its sub-items are cleared so they inherit it on the next [`renumber`].
/// Payments are never touched. Returns `None` if the id is unknown or names a
/// payment.
pub fn recolor_group(tasks: &[Task], task_id: &str, color: &str) -> Option<Vec<Task>> {
    let target = tasks.iter().find(|t| t.id == task_id)?;
    if target.is_payment() {
        return None;
    }
    let group = target.group;

    let recolored = tasks
        .iter()
        .map(|t| {
            let mut t = t.clone();
            if !t.is_payment() && t.group == group {
                t.color = t.is_main().then(|| color.to_string());
            }
            t
        })
        .collect();
    Some(recolored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Task> {
        vec![
            Task::new("a"),
            Task::new("b").level(1),
            Task::new("c").level(1),
            Task::new("d"),
        ]
    }

    #[test]
    fn numbers_and_groups() {
        let out = renumber(&sample());
        let numbers: Vec<_> = out.iter().map(|t| t.no.as_str()).collect();
        let groups: Vec<_> = out.iter().map(|t| t.group).collect();
        assert_eq!(numbers, vec!["0", "0.1", "0.2", "1"]);
        assert_eq!(groups, vec![0, 0, 0, 1]);
    }

    #[test]
    fn sub_counter_restarts_per_group() {
        let tasks = vec![
            Task::new("a"),
            Task::new("a1").level(1),
            Task::new("b"),
            Task::new("b1").level(1),
            Task::new("b2").level(2),
        ];
        let numbers: Vec<_> = renumber(&tasks).into_iter().map(|t| t.no).collect();
        assert_eq!(numbers, vec!["0", "0.1", "1", "1.1", "1.2"]);
    }

    #[test]
    fn payments_are_marked_and_skip_numbering() {
        let tasks = vec![
            Task::payment("p0"),
            Task::new("a"),
            Task::payment("p1"),
            Task::new("a1").level(1),
            Task::new("b"),
        ];
        let out = renumber(&tasks);
        let numbers: Vec<_> = out.iter().map(|t| t.no.as_str()).collect();
        assert_eq!(numbers, vec![PAYMENT_MARKER, "0", PAYMENT_MARKER, "0.1", "1"]);
        assert_eq!(out[0].group, 0);
        assert_eq!(out[2].group, 0);
        assert_eq!(out[2].display_color, out[1].display_color);
    }

    #[test]
    fn level_zero_payment_does_not_open_a_group() {
        let tasks = vec![Task::new("a"), Task::payment("p").level(0), Task::new("a1").level(1)];
        let out = renumber(&tasks);
        assert_eq!(out[2].no, "0.1");
        assert_eq!(out[2].group, 0);
    }

    #[test]
    fn orphan_sub_items() {
        let tasks = vec![Task::new("x").level(1), Task::new("a")];
        let out = renumber(&tasks);
        assert_eq!(out[0].no, "-1.1");
        assert_eq!(out[0].group, 0);
        assert_eq!(out[1].no, "0");
    }

    #[test]
    fn palette_colors_cycle() {
        let tasks: Vec<_> = (0..10).map(|i| Task::new(format!("m{i}"))).collect();
        let out = renumber(&tasks);
        assert_eq!(out[0].display_color, DEFAULT_PALETTE[0]);
        assert_eq!(out[7].display_color, DEFAULT_PALETTE[7]);
        assert_eq!(out[8].display_color, DEFAULT_PALETTE[0]);
        assert_eq!(out[9].display_color, DEFAULT_PALETTE[1]);
    }

    #[test]
    fn explicit_colors_win() {
        let tasks = vec![
            Task::new("a").color("#111111"),
            Task::new("a1").level(1),
            Task::new("a2").level(1).color("#222222"),
        ];
        let out = renumber(&tasks);
        assert_eq!(out[0].display_color, "#111111");
        assert_eq!(out[1].display_color, "#111111");
        assert_eq!(out[2].display_color, "#222222");
        // Overrides stay explicit, inheritance stays derived
        assert_eq!(out[1].color, None);
    }

    #[test]
    fn renumber_is_idempotent() {
        let tasks = vec![
            Task::payment("p0"),
            Task::new("a").color("#123456"),
            Task::new("a1").level(1),
            Task::new("b"),
            Task::payment("p1"),
            Task::new("b1").level(1).color("#654321"),
        ];
        let once = renumber(&tasks);
        let twice = renumber(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn inherited_color_changes_on_next_pass() {
        let mut tasks = renumber(&sample());
        tasks[0].color = Some("#000000".into());
        // Not yet re-derived
        assert_eq!(tasks[1].display_color, DEFAULT_PALETTE[0]);

        let tasks = renumber(&tasks);
        assert_eq!(tasks[0].display_color, "#000000");
        assert_eq!(tasks[1].display_color, "#000000");
        assert_eq!(tasks[2].display_color, "#000000");
        assert_eq!(tasks[3].display_color, DEFAULT_PALETTE[1]);
    }

    #[test]
    fn recolor_group_clears_sub_overrides() {
        let mut tasks = sample();
        tasks[2].color = Some("#FFFFFF".into());
        tasks.insert(3, Task::payment("p"));
        let tasks = renumber(&tasks);

        let recolored = recolor_group(&tasks, "b", "#ABCDEF").unwrap();
        assert_eq!(recolored[0].color.as_deref(), Some("#ABCDEF"));
        assert_eq!(recolored[1].color, None);
        assert_eq!(recolored[2].color, None);
        assert_eq!(recolored[3].color, None);
        assert_eq!(recolored[4].color, None);

        let out = renumber(&recolored);
        let colors: Vec<_> = out.iter().map(|t| t.display_color.as_str()).collect();
        assert_eq!(colors, vec!["#ABCDEF", "#ABCDEF", "#ABCDEF", "#ABCDEF", DEFAULT_PALETTE[1]]);
    }

    #[test]
    fn recolor_unknown_or_payment_is_rejected() {
        let tasks = renumber(&[Task::new("a"), Task::payment("p")]);
        assert!(recolor_group(&tasks, "missing", "#000000").is_none());
        assert!(recolor_group(&tasks, "p", "#000000").is_none());
    }
}
