//! Runtime event stream payloads.

use crate::record::CalculationRecord;

/// Events broadcast from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcEvent {
    /// A calculation was committed.
    CalculationAdded {
        /// Committed record.
        record: CalculationRecord,
    },
    /// History was emptied.
    HistoryCleared,
    /// One undo step was applied.
    UndoApplied {
        /// History length after the undo.
        len: usize,
    },
    /// One redo step was applied.
    RedoApplied {
        /// History length after the redo.
        len: usize,
    },
}
