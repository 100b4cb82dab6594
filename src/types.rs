//! Operation names and arity rules.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Arithmetic operation in the fixed registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// `a + b`.
    Add,
    /// `a - b`.
    Subtract,
    /// `a * b`.
    Multiply,
    /// `a / b`.
    Divide,
    /// `a` raised to `b`.
    Power,
    /// Square root of `a`, or `b`-th root of `a` when `b` is given.
    Root,
    /// Remainder of `a / b` for integral operands.
    Modulus,
    /// `-a`.
    Negate,
    /// `|a|`.
    Abs,
}

/// How many operands an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one operand.
    Unary,
    /// Exactly two operands.
    Binary,
    /// One operand, with an optional second.
    UnaryOrBinary,
}

impl Arity {
    /// Returns true when `n` operands are acceptable.
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Unary => n == 1,
            Arity::Binary => n == 2,
            Arity::UnaryOrBinary => n == 1 || n == 2,
        }
    }

    /// Human-readable operand count, used in validation messages.
    pub fn describe(self) -> &'static str {
        match self {
            Arity::Unary => "exactly 1 operand",
            Arity::Binary => "exactly 2 operands",
            Arity::UnaryOrBinary => "1 or 2 operands",
        }
    }
}

impl Operation {
    /// Every registered operation, in display order.
    pub const ALL: [Operation; 9] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
        Operation::Power,
        Operation::Root,
        Operation::Modulus,
        Operation::Negate,
        Operation::Abs,
    ];

    /// Stable lowercase name, as written to the history file.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
            Operation::Power => "power",
            Operation::Root => "root",
            Operation::Modulus => "modulus",
            Operation::Negate => "negate",
            Operation::Abs => "abs",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Operation::Negate | Operation::Abs => Arity::Unary,
            Operation::Root => Arity::UnaryOrBinary,
            _ => Arity::Binary,
        }
    }

    /// Comma-separated list of all operation names.
    pub fn available() -> String {
        Self::ALL
            .iter()
            .map(|op| op.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a name does not match any registered operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operation '{0}'")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownOperation(wanted.to_string()))
    }
}
