//! Bounded undo/redo stacks of full-list snapshots.

use crate::constants::DEFAULT_HISTORY_LIMIT;
use crate::overlay::annotation::Annotation;
use crate::overlay::store::AnnotationStore;

type Snapshot = Vec<Annotation>;

/// What the most recent `record_snapshot` threw away, so it can be put back
#[derive(Clone, Debug)]
struct LastRecord {
    cleared_redo: Vec<Snapshot>,
    trimmed: Option<Snapshot>,
}

#[derive(Clone, Debug)]
pub struct HistoryManager {
    /// Snapshots that can be restored by undo (most recent last)
    undo_stack: Vec<Snapshot>,
    /// Snapshots that can be restored by redo (most recent last)
    redo_stack: Vec<Snapshot>,
    limit: usize,
    last_record: Option<LastRecord>,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryManager {
    /// A history keeping at most `limit` undo steps (at least one)
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
            last_record: None,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the cap, dropping the oldest snapshots if needed
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        self.trim(&mut None);
        let excess = self.redo_stack.len().saturating_sub(self.limit);
        self.redo_stack = self.redo_stack.split_off(excess);
        self.last_record = None;
    }

    /// Push the store's current list onto undo and clear redo.
    ///
    /// Call immediately before the mutation it protects.
    pub fn record_snapshot(&mut self, store: &AnnotationStore) {
        let cleared_redo = std::mem::take(&mut self.redo_stack);
        self.undo_stack.push(store.snapshot());

        let mut trimmed = None;
        self.trim(&mut trimmed);
        self.last_record = Some(LastRecord {
            cleared_redo,
            trimmed,
        });
    }

    /// Withdraw the most recent snapshot, restoring the redo stack it
    /// cleared. No-op unless the last history operation was a record.
    pub fn discard_latest(&mut self) -> bool {
        let Some(last) = self.last_record.take() else {
            return false;
        };
        if self.undo_stack.pop().is_none() {
            return false;
        }
        if let Some(oldest) = last.trimmed {
            self.undo_stack.insert(0, oldest);
        }
        self.redo_stack = last.cleared_redo;
        true
    }

    /// Restore the previous list. Returns false when there is nothing to undo.
    pub fn undo(&mut self, store: &mut AnnotationStore) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        self.last_record = None;
        self.redo_stack.push(store.snapshot());
        store.restore(previous);
        true
    }

    /// Re-apply the last undone list. Returns false when there is nothing to redo.
    pub fn redo(&mut self, store: &mut AnnotationStore) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.last_record = None;
        self.undo_stack.push(store.snapshot());
        let mut dropped = None;
        self.trim(&mut dropped);
        store.restore(next);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.last_record = None;
    }

    fn trim(&mut self, dropped: &mut Option<Snapshot>) {
        while self.undo_stack.len() > self.limit {
            *dropped = Some(self.undo_stack.remove(0));
        }
    }
}
