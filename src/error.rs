//! Error taxonomy for calculator commands.

use thiserror::Error;

use crate::persist::PersistError;

/// Errors returned by the calculator command surface.
///
/// None of these are fatal: the caller reports them and keeps going.
#[derive(Debug, Error)]
pub enum CalcError {
    /// Malformed input: non-finite operand, wrong operand count, unparsable text.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The operation is mathematically undefined for these operands.
    #[error("math error: {0}")]
    Domain(String),

    /// The operation name is not in the registry.
    #[error("unsupported operation '{name}' (available: {available})")]
    InvalidOperation {
        /// Name as given by the caller.
        name: String,
        /// Registered operation names.
        available: String,
    },

    /// Undo stack is empty.
    #[error("nothing to undo")]
    NothingToUndo,

    /// Redo stack is empty.
    #[error("nothing to redo")]
    NothingToRedo,

    /// Save or load was requested without a persistence sink.
    #[error("no history file is attached")]
    NoSink,

    /// Persistence failed.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl CalcError {
    /// Shorthand for [`CalcError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Shorthand for [`CalcError::Domain`].
    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }
}

impl From<crate::types::UnknownOperation> for CalcError {
    fn from(value: crate::types::UnknownOperation) -> Self {
        Self::InvalidOperation {
            name: value.0,
            available: crate::types::Operation::available(),
        }
    }
}
