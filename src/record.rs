//! Calculation record value type.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Operation;

/// One completed calculation.
///
/// Records are plain `Copy` values with no interior references, so any copy
/// (history read, snapshot, persisted row) is fully independent of the live
/// history. Fields are only reachable through accessors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    operation: Operation,
    operand_a: f64,
    operand_b: Option<f64>,
    result: f64,
    timestamp: DateTime<Utc>,
}

impl CalculationRecord {
    /// Builds a record from already-computed parts.
    pub fn new(
        operation: Operation,
        operand_a: f64,
        operand_b: Option<f64>,
        result: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            operation,
            operand_a,
            operand_b,
            result,
            timestamp,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn operand_a(&self) -> f64 {
        self.operand_a
    }

    /// Second operand; `None` for unary calculations.
    pub fn operand_b(&self) -> Option<f64> {
        self.operand_b
    }

    /// Result rounded to the configured number of decimal places.
    pub fn result(&self) -> f64 {
        self.result
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl fmt::Display for CalculationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand_b {
            Some(b) => write!(f, "{} {} {} = {}", self.operation, self.operand_a, b, self.result),
            None => write!(f, "{} {} = {}", self.operation, self.operand_a, self.result),
        }
    }
}
