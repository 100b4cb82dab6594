use std::collections::BTreeMap;

use serde::Serialize;

use crate::{record::CalculationRecord, types::Operation};

/// Aggregate over a set of results.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub count: usize,
    pub sum: f64,
    /// `None` when `count` is zero.
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Summary {
    fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.mean = Some(self.sum / self.count as f64);
    }
}

/// Result statistics, overall and per operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Statistics {
    pub overall: Summary,
    /// Only operations that occur in history are present.
    pub per_operation: BTreeMap<Operation, Summary>,
}

impl Statistics {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CalculationRecord>) -> Self {
        let mut stats = Self::default();
        for rec in records {
            stats.overall.add(rec.result());
            stats
                .per_operation
                .entry(rec.operation())
                .or_default()
                .add(rec.result());
        }
        stats
    }

    pub fn for_operation(&self, op: Operation) -> Summary {
        self.per_operation.get(&op).copied().unwrap_or_default()
    }
}
