//! History persistence abstraction and the CSV file implementation.

/// CSV file adapter.
pub mod csv;

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use thiserror::Error;

use crate::record::CalculationRecord;

#[derive(Debug, Error)]
pub enum PersistError {
    /// Reading, writing or renaming the history file failed.
    #[error("history file I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The first line is not the expected column header.
    #[error("history file has unexpected header '{found}'")]
    InvalidHeader {
        /// Header line as read.
        found: String,
    },
}

pub type PersistResult<T> = Result<T, PersistError>;

/// A malformed history row, skipped during load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("corrupt history row at line {line}: {reason}")]
pub struct CorruptRow {
    /// 1-based line number in the file.
    pub line: usize,
    /// Why the row was rejected.
    pub reason: String,
}

/// Result of reading a history file.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// No file at the path; history is empty.
    Missing,
    /// File parsed; malformed rows were skipped.
    Loaded {
        /// Valid rows in file order.
        records: Vec<CalculationRecord>,
        /// Rows that were skipped.
        corrupt: Vec<CorruptRow>,
    },
}

impl LoadOutcome {
    pub fn records(&self) -> &[CalculationRecord] {
        match self {
            LoadOutcome::Missing => &[],
            LoadOutcome::Loaded { records, .. } => records,
        }
    }

    pub fn into_records(self) -> Vec<CalculationRecord> {
        match self {
            LoadOutcome::Missing => Vec::new(),
            LoadOutcome::Loaded { records, .. } => records,
        }
    }

    pub fn corrupt_rows(&self) -> &[CorruptRow] {
        match self {
            LoadOutcome::Missing => &[],
            LoadOutcome::Loaded { corrupt, .. } => corrupt,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, LoadOutcome::Missing)
    }
}

/// Durable storage for a whole history.
pub trait HistorySink: Send {
    /// Replaces the stored history with `records`.
    fn save(&mut self, records: &[CalculationRecord]) -> PersistResult<()>;
    /// Reads the stored history.
    fn load(&self) -> PersistResult<LoadOutcome>;
    /// Where the history lives, for messages.
    fn location(&self) -> &Path;
}

impl fmt::Debug for dyn HistorySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistorySink")
            .field("location", &self.location())
            .finish()
    }
}

/// Sink shared between the calculator and its auto-save listener.
pub type SharedSink = Arc<Mutex<Box<dyn HistorySink>>>;

pub fn shared(sink: Box<dyn HistorySink>) -> SharedSink {
    Arc::new(Mutex::new(sink))
}

/// Saves through a shared sink. A poisoned lock is recovered.
pub fn save_shared(sink: &SharedSink, records: &[CalculationRecord]) -> PersistResult<()> {
    let mut guard = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.save(records)
}

pub fn load_shared(sink: &SharedSink) -> PersistResult<LoadOutcome> {
    let guard = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.load()
}

pub fn shared_location(sink: &SharedSink) -> PathBuf {
    let guard = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.location().to_path_buf()
}
