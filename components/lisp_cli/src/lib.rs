//! Baker GC CLI Library
//!
//! Provides the Runtime struct, the built-in workloads and the register REPL
//! on top of the `memory_manager` collector.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod repl;
pub mod report;
pub mod runtime;
pub mod workloads;

pub use cli::{Cli, ModeArg, WorkloadKind};
pub use error::{CliError, CliResult};
pub use report::RunReport;
pub use runtime::Runtime;
pub use workloads::{Workload, WorkloadOutput};
