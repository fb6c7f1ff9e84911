//! Undo stack: bounded history of whole-document snapshots.
//!
//! Each entry is the complete text of the document as it was just before a
//! mutating write. Undo pops the newest entry and writes it back verbatim.
//! There is no redo: popping discards that step for good.
//!
//! The stack holds at most [`MAX_UNDO_STEPS`] entries. Pushing past the limit
//! evicts the oldest snapshot, so memory stays bounded by
//! `limit × document size`.

use std::collections::VecDeque;

/// Default number of snapshots kept per document.
pub const MAX_UNDO_STEPS: usize = 50;

/// Bounded LIFO of document snapshots.
#[derive(Debug, Clone)]
pub struct UndoStack {
    snapshots: VecDeque<String>,
    limit: usize,
}

impl UndoStack {
    /// An empty stack holding up to [`MAX_UNDO_STEPS`] snapshots.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(MAX_UNDO_STEPS)
    }

    /// An empty stack with a custom bound. A limit of zero is raised to one.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            snapshots: VecDeque::new(),
            limit,
        }
    }

    /// Push a snapshot. Returns the evicted oldest snapshot if the bound was
    /// exceeded.
    pub fn push(&mut self, snapshot: String) -> Option<String> {
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > self.limit {
            self.snapshots.pop_front()
        } else {
            None
        }
    }

    /// Pop the most recent snapshot.
    pub fn pop(&mut self) -> Option<String> {
        self.snapshots.pop_back()
    }

    /// Number of snapshots held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True if there is nothing to undo.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Maximum number of snapshots held.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Drop every snapshot.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
