//! Error types for the CLI

use core_types::{ErrorKind, GcError};
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Collector error (heap exhausted, contract violation, ...)
    #[error("{0}")]
    Gc(#[from] GcError),

    /// File I/O error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Run report serialization error
    #[error("Report error: {0}")]
    Json(#[from] serde_json::Error),

    /// REPL error
    #[error("REPL error: {0}")]
    Repl(String),

    /// A workload self-check failed
    #[error("Workload failed: {0}")]
    Workload(String),
}

impl CliError {
    /// Whether the process must stop: the heap can no longer be trusted or
    /// has no room left.
    pub fn is_fatal(&self) -> bool {
        match self {
            CliError::Gc(err) => matches!(
                err.kind(),
                ErrorKind::HeapExhausted | ErrorKind::InvariantViolation
            ),
            CliError::Workload(_) => true,
            CliError::Io(_) | CliError::Json(_) | CliError::Repl(_) => false,
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
