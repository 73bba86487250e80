//! Collector error types.
//!
//! Every error in this runtime is fatal: there is no compaction, resize or
//! retry path, so callers propagate the error to the top and terminate with
//! the diagnostic message.

use thiserror::Error;

use crate::Value;

/// The kind of collector error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The live set no longer fits in one semispace
    HeapExhausted,
    /// A collector invariant was breached (engine bug)
    InvariantViolation,
    /// A caller used a value as the wrong variant
    TypeContractViolation,
    /// Construction-time configuration was rejected
    InvalidConfig,
}

/// An error raised by the collector or its accessors.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, GcError};
///
/// let err = GcError::HeapExhausted { capacity: 8 };
/// assert_eq!(err.kind(), ErrorKind::HeapExhausted);
/// assert_eq!(err.to_string(), "out of memory: semispace of 8 cells is full");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GcError {
    /// No free area left after collecting, or tospace filled while copying
    #[error("out of memory: semispace of {capacity} cells is full")]
    HeapExhausted {
        /// Capacity of one semispace, in cells
        capacity: usize,
    },

    /// Cursor ordering, alignment or forwarding invariant broken
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Integer used as a cell, cell decoded as an integer, and similar
    #[error("type contract violation: expected {expected}, found {found}")]
    TypeContractViolation {
        /// What the operation required
        expected: &'static str,
        /// What it was given
        found: String,
    },

    /// Rejected collector configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GcError {
    /// Builds a [`GcError::TypeContractViolation`] for `found`.
    pub fn type_violation(expected: &'static str, found: Value) -> Self {
        GcError::TypeContractViolation {
            expected,
            found: format!("{:?}", found),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GcError::HeapExhausted { .. } => ErrorKind::HeapExhausted,
            GcError::InvariantViolation(_) => ErrorKind::InvariantViolation,
            GcError::TypeContractViolation { .. } => ErrorKind::TypeContractViolation,
            GcError::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }
}
