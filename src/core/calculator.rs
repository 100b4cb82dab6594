use std::path::PathBuf;

use crate::{
    config::CalculatorConfig,
    core::{history::HistoryStore, snapshot::SnapshotManager, stats::Statistics},
    error::CalcError,
    notify::{
        self, EventKind, ListenerError, ListenerFailure, ListenerId, Notification,
        NotificationHub,
    },
    persist::{self, HistorySink, LoadOutcome, SharedSink, csv::CsvHistoryFile},
    record::CalculationRecord,
    types::Operation,
};

/// Command surface over history, undo/redo, notifications and persistence.
///
/// Every mutating command runs snapshot, apply, notify to completion before
/// returning. Listener failures never fail the command; they are queued and
/// can be drained with [`Calculator::take_listener_failures`].
#[derive(Debug)]
pub struct Calculator {
    config: CalculatorConfig,
    store: HistoryStore,
    snapshots: SnapshotManager,
    hub: NotificationHub,
    sink: Option<SharedSink>,
    failures: Vec<ListenerFailure>,
}

impl Calculator {
    /// In-memory calculator with no history file.
    pub fn new(config: &CalculatorConfig) -> Self {
        Self {
            config: config.clone(),
            store: HistoryStore::new(config),
            snapshots: SnapshotManager::new(),
            hub: NotificationHub::new(),
            sink: None,
            failures: Vec::new(),
        }
    }

    /// Attaches `sink`, registering auto-save when the config enables it.
    ///
    /// Nothing is loaded; call [`Calculator::load`] or use [`Calculator::open`].
    pub fn with_sink(config: &CalculatorConfig, sink: Box<dyn HistorySink>) -> Self {
        let mut calc = Self::new(config);
        let sink = persist::shared(sink);
        if config.auto_save {
            calc.hub
                .subscribe(EventKind::CalculationAdded, notify::auto_save_listener(sink.clone()));
        }
        calc.sink = Some(sink);
        calc
    }

    /// Opens the CSV history at `config.history_file` and loads it.
    ///
    /// The initial load is not undoable. A missing file starts empty.
    pub fn open(config: &CalculatorConfig) -> Result<(Self, LoadOutcome), CalcError> {
        let mut calc = Self::with_sink(config, Box::new(CsvHistoryFile::new(&config.history_file)));
        let outcome = calc.read_sink()?;
        calc.store.replace(outcome.records().to_vec());
        Ok((calc, outcome))
    }

    /// Evaluates `name` on `operands` and commits the record.
    pub fn execute(
        &mut self,
        name: &str,
        operands: &[f64],
    ) -> Result<CalculationRecord, CalcError> {
        let op: Operation = name.parse()?;
        self.execute_op(op, operands)
    }

    pub fn execute_op(
        &mut self,
        op: Operation,
        operands: &[f64],
    ) -> Result<CalculationRecord, CalcError> {
        let rec = self.store.prepare(op, operands)?;
        self.snapshots.before_mutation(&self.store);
        self.store.push(rec);
        log::debug!("committed {rec}");
        self.notify(EventKind::CalculationAdded, Some(rec));
        Ok(rec)
    }

    /// Restores the state before the last mutation.
    pub fn undo(&mut self) -> Result<Vec<CalculationRecord>, CalcError> {
        let history = self.snapshots.undo(&mut self.store)?;
        log::debug!("undo: history now has {} records", history.len());
        self.notify(EventKind::UndoPerformed, None);
        Ok(history)
    }

    pub fn redo(&mut self) -> Result<Vec<CalculationRecord>, CalcError> {
        let history = self.snapshots.redo(&mut self.store)?;
        log::debug!("redo: history now has {} records", history.len());
        self.notify(EventKind::RedoPerformed, None);
        Ok(history)
    }

    /// Empties history. Undoable.
    pub fn clear(&mut self) {
        self.snapshots.before_mutation(&self.store);
        self.store.clear();
        log::debug!("history cleared");
        self.notify(EventKind::HistoryCleared, None);
    }

    /// Writes the current history to the attached sink.
    pub fn save(&mut self) -> Result<PathBuf, CalcError> {
        let sink = self.sink.as_ref().ok_or(CalcError::NoSink)?;
        persist::save_shared(sink, self.store.as_slice())?;
        Ok(persist::shared_location(sink))
    }

    /// Replaces history with the sink's content. Undoable.
    ///
    /// Rows beyond `max_history` are dropped oldest first.
    pub fn load(&mut self) -> Result<LoadOutcome, CalcError> {
        let outcome = self.read_sink()?;
        self.snapshots.before_mutation(&self.store);
        self.store.replace(outcome.records().to_vec());
        Ok(outcome)
    }

    pub fn history(&self) -> Vec<CalculationRecord> {
        self.store.all()
    }

    pub fn recent(&self, n: usize) -> Vec<CalculationRecord> {
        self.store.recent(n)
    }

    pub fn statistics(&self) -> Statistics {
        self.store.statistics()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.snapshots.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.snapshots.can_redo()
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Path of the attached sink, if any.
    pub fn history_location(&self) -> Option<PathBuf> {
        self.sink.as_ref().map(persist::shared_location)
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&Notification<'_>) -> Result<(), ListenerError> + Send + 'static,
    {
        self.hub.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.hub.unsubscribe(id)
    }

    /// Listener failures since the last call, oldest first.
    pub fn take_listener_failures(&mut self) -> Vec<ListenerFailure> {
        std::mem::take(&mut self.failures)
    }

    fn read_sink(&self) -> Result<LoadOutcome, CalcError> {
        let sink = self.sink.as_ref().ok_or(CalcError::NoSink)?;
        Ok(persist::load_shared(sink)?)
    }

    fn notify(&mut self, kind: EventKind, record: Option<CalculationRecord>) {
        let note = Notification {
            kind,
            record,
            history: self.store.as_slice(),
        };
        let failures = self.hub.publish(&note);
        self.failures.extend(failures);
    }
}
