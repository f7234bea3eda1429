//! Bounded undo/redo history
//!
//! [`History`] keeps a `past` stack, a `present` value and a `future` stack.
//! [`History::commit`] is the only way to change the present; it clears the
//! redo branch and drops the oldest snapshot once more than `limit` are kept.
//!
//! ```rust
//! use weekgantt_core::history::History;
//!
//! let mut history = History::new(1);
//! history.commit(2);
//! history.commit_with(|n| n * 10);
//! assert_eq!(*history.present(), 20);
//!
//! history.undo();
//! assert_eq!(*history.present(), 2);
//! history.redo();
//! assert_eq!(*history.present(), 20);
//! ```

use std::collections::VecDeque;

use crate::MAX_HISTORY;

/// Undo/redo stack over a value of type `T`
#[derive(Clone, Debug)]
pub struct History<T> {
    past: VecDeque<T>,
    present: T,
    future: VecDeque<T>,
    limit: usize,
}

impl<T> History<T> {
    /// Start a history at `initial`, keeping up to [`MAX_HISTORY`] snapshots
    pub fn new(initial: T) -> Self {
        Self::with_limit(initial, MAX_HISTORY)
    }

    /// Start a history with a custom depth bound (at least 1)
    pub fn with_limit(initial: T, limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Replace the present, recording the previous value as an undo step
    pub fn commit(&mut self, value: T) {
        let previous = std::mem::replace(&mut self.present, value);
        self.past.push_back(previous);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
    }

    /// Commit the value computed from the current present
    pub fn commit_with(&mut self, update: impl FnOnce(&T) -> T) {
        let value = update(&self.present);
        self.commit(value);
    }

    /// Step back one snapshot; returns `false` when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        match self.past.pop_back() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.present, previous);
                self.future.push_front(current);
                true
            }
            None => false,
        }
    }

    /// Step forward one snapshot; returns `false` when there is nothing to redo
    pub fn redo(&mut self) -> bool {
        match self.future.pop_front() {
            Some(next) => {
                let current = std::mem::replace(&mut self.present, next);
                self.past.push_back(current);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of available undo steps
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    /// Number of available redo steps
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl<T: Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
