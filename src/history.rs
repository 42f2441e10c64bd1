//! Bounded linear undo/redo history with property-patch coalescing.
//!
//! DESIGN
//! ======
//! Each entry pairs the forward operations of one user action with the
//! inverse operations that revert it. Undo applies the inverse and moves the
//! entry to the redo stack; redo re-applies the forward operations.
//!
//! Runs of `set_element_properties` on the same set of elements that arrive
//! within the coalescing window merge into the entry on top of the undo
//! stack: the forward side keeps the latest values, the inverse side keeps
//! the values from before the first patch. The window slides from the last
//! merged patch. `seal` ends a run early (pointer-up ends a drag).
//!
//! History only stores operations. Applying them is the board's job.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::BoardConfig;
use crate::element::{ElementId, PropertyPatch};
use crate::ops::{AppliedOperation, Operation};

/// Outcome of an undo or redo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStatus {
    /// An entry was reverted or re-applied.
    Applied,
    /// Nothing to undo (or redo).
    Empty,
    /// The board refused: it is read-only, or the entry no longer applies.
    Blocked,
}

/// One undoable step.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Operations re-applied by redo, in order.
    pub forward: Vec<Operation>,
    /// Operations applied by undo, in order.
    pub inverse: Vec<Operation>,
    coalesce_key: Option<Vec<ElementId>>,
    last_at: Instant,
}

/// Undo and redo stacks, each at most `limit` deep.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    limit: usize,
    window: Duration,
    sealed: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::from_config(&BoardConfig::default())
    }
}

impl History {
    #[must_use]
    pub fn new(limit: usize, window: Duration) -> Self {
        Self { undo: VecDeque::new(), redo: Vec::new(), limit, window, sealed: false }
    }

    #[must_use]
    pub fn from_config(config: &BoardConfig) -> Self {
        Self::new(config.history_limit, config.coalesce_window)
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.sealed = false;
    }

    /// End the current coalescing run.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    // =========================================================================
    // RECORD
    // =========================================================================

    /// Record one applied operation.
    pub fn record(&mut self, applied: AppliedOperation) {
        self.record_batch_at(vec![applied], Instant::now());
    }

    /// Record several applied operations as one entry.
    pub fn record_batch(&mut self, applied: Vec<AppliedOperation>) {
        self.record_batch_at(applied, Instant::now());
    }

    /// Record one applied operation observed at `now`.
    pub fn record_at(&mut self, applied: AppliedOperation, now: Instant) {
        self.record_batch_at(vec![applied], now);
    }

    /// Record several applied operations, observed at `now`, as one entry.
    /// Clears the redo stack.
    pub fn record_batch_at(&mut self, applied: Vec<AppliedOperation>, now: Instant) {
        if applied.is_empty() {
            return;
        }
        let mut forward = Vec::with_capacity(applied.len());
        let mut inverse_groups = Vec::with_capacity(applied.len());
        for a in applied {
            forward.push(a.operation);
            inverse_groups.push(a.inverse);
        }
        let inverse: Vec<Operation> = inverse_groups.into_iter().rev().flatten().collect();
        let entry = HistoryEntry { coalesce_key: coalesce_key(&forward), forward, inverse, last_at: now };

        self.redo.clear();
        let sealed = std::mem::replace(&mut self.sealed, false);
        if !sealed && self.try_merge(&entry) {
            return;
        }
        if self.limit == 0 {
            return;
        }
        self.undo.push_back(entry);
        if self.undo.len() > self.limit {
            self.undo.pop_front();
            debug!(limit = self.limit, "history full; evicted oldest entry");
        }
    }

    fn try_merge(&mut self, entry: &HistoryEntry) -> bool {
        let Some(key) = entry.coalesce_key.as_ref() else {
            return false;
        };
        let window = self.window;
        let Some(top) = self.undo.back_mut() else {
            return false;
        };
        if top.coalesce_key.as_ref() != Some(key) || entry.last_at.saturating_duration_since(top.last_at) > window {
            return false;
        }
        top.forward = merge_patches(top.forward.iter().chain(&entry.forward));
        top.inverse = merge_patches(entry.inverse.iter().chain(&top.inverse));
        top.last_at = entry.last_at;
        debug!(elements = key.len(), "coalesced property patch");
        true
    }

    // =========================================================================
    // UNDO / REDO
    // =========================================================================

    /// Take the most recent entry for undoing. The caller applies its inverse
    /// and hands it back through [`History::push_redo`].
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        self.sealed = true;
        self.undo.pop_back()
    }

    /// Take the most recently undone entry for redoing. The caller applies its
    /// forward operations and hands it back through [`History::push_undo`].
    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        self.sealed = true;
        self.redo.pop()
    }

    pub fn push_redo(&mut self, entry: HistoryEntry) {
        self.redo.push(entry);
    }

    /// Return a redone entry to the undo stack without clearing redo.
    pub fn push_undo(&mut self, entry: HistoryEntry) {
        self.undo.push_back(entry);
        if self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }
}

/// Sorted ids when every operation is a property patch; otherwise `None`.
fn coalesce_key(ops: &[Operation]) -> Option<Vec<ElementId>> {
    let mut ids = Vec::with_capacity(ops.len());
    for op in ops {
        match op {
            Operation::SetElementProperties { id, .. } => ids.push(id.clone()),
            _ => return None,
        }
    }
    ids.sort();
    ids.dedup();
    Some(ids)
}

/// Fold property patches per element; later patches win field by field.
fn merge_patches<'a>(ops: impl Iterator<Item = &'a Operation>) -> Vec<Operation> {
    let mut merged: BTreeMap<ElementId, PropertyPatch> = BTreeMap::new();
    for op in ops {
        if let Operation::SetElementProperties { id, patch } = op {
            let next = match merged.get(id) {
                Some(acc) => acc.overlay(patch),
                None => patch.clone(),
            };
            merged.insert(id.clone(), next);
        }
    }
    merged.into_iter().map(|(id, patch)| Operation::SetElementProperties { id, patch }).collect()
}
