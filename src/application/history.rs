// src/application/history.rs
use std::collections::VecDeque;

use crate::constants::HISTORY_DEPTH;
use crate::domain::{Document, Selection};

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub document: Document,
    pub selection: Selection,
}

/// Linear undo/redo stacks of whole-document snapshots.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    depth: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_depth(HISTORY_DEPTH)
    }

    pub fn with_depth(depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Records the state before a change; any redo branch is discarded.
    pub fn record(&mut self, before: Snapshot) {
        if self.undo.len() == self.depth {
            self.undo.pop_front();
        }
        self.undo.push_back(before);
        self.redo.clear();
    }

    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Block;

    fn snap(text: &str) -> Snapshot {
        Snapshot {
            document: Document::new(vec![Block::paragraph(text)]),
            selection: Selection::default(),
        }
    }

    #[test]
    fn given_depth_exceeded_when_recording_then_drops_oldest() {
        let mut history = History::with_depth(2);
        history.record(snap("a"));
        history.record(snap("b"));
        history.record(snap("c"));

        assert_eq!(history.undo(snap("d")), Some(snap("c")));
        assert_eq!(history.undo(snap("c")), Some(snap("b")));
        assert_eq!(history.undo(snap("b")), None);
    }

    #[test]
    fn given_undone_change_when_recording_new_change_then_redo_is_cleared() {
        let mut history = History::new();
        history.record(snap("a"));
        history.undo(snap("b"));
        assert!(history.can_redo());

        history.record(snap("a"));

        assert!(!history.can_redo());
    }
}
