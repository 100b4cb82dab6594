use std::collections::VecDeque;

use chrono::Utc;

use crate::{
    config::{CalculatorConfig, MAX_DECIMAL_PLACES},
    core::{snapshot::Snapshot, stats::Statistics},
    error::CalcError,
    operations,
    record::CalculationRecord,
    types::Operation,
};

/// Bounded, chronologically ordered calculation log.
///
/// Holds at most `max_history` records; pushing beyond that evicts the
/// oldest. Reads hand out copies, never the live sequence.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    records: VecDeque<CalculationRecord>,
    max_history: usize,
    decimal_places: u32,
}

impl HistoryStore {
    pub fn new(config: &CalculatorConfig) -> Self {
        Self::with_limits(config.max_history, config.decimal_places)
    }

    /// `max_history` is clamped to at least one and `decimal_places` to
    /// [`MAX_DECIMAL_PLACES`].
    pub fn with_limits(max_history: usize, decimal_places: u32) -> Self {
        let max_history = max_history.max(1);
        Self {
            records: VecDeque::with_capacity(max_history.min(1024)),
            max_history,
            decimal_places: decimal_places.min(MAX_DECIMAL_PLACES),
        }
    }

    /// Computes, rounds and appends a calculation.
    ///
    /// On error the history is left untouched.
    pub fn record(
        &mut self,
        op: Operation,
        operands: &[f64],
    ) -> Result<CalculationRecord, CalcError> {
        let rec = self.prepare(op, operands)?;
        self.push(rec);
        Ok(rec)
    }

    /// Like [`HistoryStore::record`] but looks the operation up by name.
    pub fn record_named(
        &mut self,
        name: &str,
        operands: &[f64],
    ) -> Result<CalculationRecord, CalcError> {
        let op: Operation = name.parse()?;
        self.record(op, operands)
    }

    /// Builds the record `record` would append, without mutating.
    pub fn prepare(&self, op: Operation, operands: &[f64]) -> Result<CalculationRecord, CalcError> {
        let (checked, result) = operations::evaluate(op, operands, self.decimal_places)?;
        Ok(CalculationRecord::new(op, checked.a, checked.b, result, Utc::now()))
    }

    /// Appends `rec`, evicting from the front while over capacity.
    pub fn push(&mut self, rec: CalculationRecord) {
        self.records.push_back(rec);
        while self.records.len() > self.max_history {
            if let Some(evicted) = self.records.pop_front() {
                log::debug!("evicted oldest record: {evicted}");
            }
        }
    }

    pub fn all(&self) -> Vec<CalculationRecord> {
        self.records.iter().copied().collect()
    }

    /// Last `n` records, oldest first.
    pub fn recent(&self, n: usize) -> Vec<CalculationRecord> {
        let start = self.records.len().saturating_sub(n);
        self.records.range(start..).copied().collect()
    }

    pub fn last(&self) -> Option<CalculationRecord> {
        self.records.back().copied()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Replaces the whole history, keeping only the newest `max_history`.
    pub fn replace(&mut self, records: Vec<CalculationRecord>) {
        let skip = records.len().saturating_sub(self.max_history);
        if skip > 0 {
            log::debug!("dropping {skip} oldest records over capacity");
        }
        self.records = records.into_iter().skip(skip).collect();
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_records(self.records.iter())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.all())
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.replace(snapshot.into_records());
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    /// Borrowed view for listeners; contiguous after `make_contiguous`.
    pub(crate) fn as_slice(&mut self) -> &[CalculationRecord] {
        self.records.make_contiguous()
    }
}
