use crate::{core::history::HistoryStore, error::CalcError, record::CalculationRecord};

/// Immutable point-in-time copy of a history.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    records: Vec<CalculationRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<CalculationRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CalculationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn into_records(self) -> Vec<CalculationRecord> {
        self.records
    }
}

/// Undo/redo stacks of whole-history snapshots.
#[derive(Debug, Default)]
pub struct SnapshotManager {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
}

impl SnapshotManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves the current state before it changes. Invalidates redo.
    pub fn before_mutation(&mut self, store: &HistoryStore) {
        self.undo.push(store.snapshot());
        self.redo.clear();
    }

    /// Restores the most recent saved state; the replaced state becomes redoable.
    pub fn undo(&mut self, store: &mut HistoryStore) -> Result<Vec<CalculationRecord>, CalcError> {
        let previous = self.undo.pop().ok_or(CalcError::NothingToUndo)?;
        self.redo.push(store.snapshot());
        store.restore(previous);
        Ok(store.all())
    }

    pub fn redo(&mut self, store: &mut HistoryStore) -> Result<Vec<CalculationRecord>, CalcError> {
        let next = self.redo.pop().ok_or(CalcError::NothingToRedo)?;
        self.undo.push(store.snapshot());
        store.restore(next);
        Ok(store.all())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Drops both stacks.
    pub fn reset(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
