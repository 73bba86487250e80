//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::warn;
use memory_manager::{GcConfig, GcMode};

use crate::workloads::Workload;

/// Collection strategy as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Bounded scan work on every allocation
    Incremental,
    /// Full trace at every flip
    StopTheWorld,
}

impl From<ModeArg> for GcMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Incremental => GcMode::Incremental,
            ModeArg::StopTheWorld => GcMode::StopTheWorld,
        }
    }
}

/// Built-in mutator programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WorkloadKind {
    /// Prime sieve over a list of integers
    Sieve,
    /// Register shuffling with rplaca/rplacd self-checks
    Registers,
    /// Short-lived cells only
    Churn,
}

/// Baker GC command-line interface
#[derive(Parser, Debug, Clone)]
#[command(name = "baker-gc")]
#[command(about = "List processing on Baker's real-time copying collector", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Cells per semispace
    #[arg(short = 's', long, default_value_t = 128)]
    pub semispace_cells: usize,

    /// Collection strategy
    #[arg(short, long, value_enum, default_value_t = ModeArg::Incremental)]
    pub mode: ModeArg,

    /// Cells scanned per allocation (implies incremental mode)
    #[arg(short = 'k', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub scan_quantum: Option<u64>,

    /// Number of root registers
    #[arg(long, default_value_t = 32)]
    pub roots: usize,

    /// Workload to run
    #[arg(short, long, value_enum, default_value_t = WorkloadKind::Sieve)]
    pub workload: WorkloadKind,

    /// Upper bound for the sieve workload
    #[arg(long, default_value_t = 50)]
    pub limit: isize,

    /// Rounds for the registers workload
    #[arg(long, default_value_t = 200)]
    pub rounds: usize,

    /// Allocations for the churn workload
    #[arg(long, default_value_t = 10_000)]
    pub count: usize,

    /// Print a heap map after every allocation
    #[arg(long)]
    pub heap_map: bool,

    /// Write a JSON run report to this file
    #[arg(long, value_name = "PATH")]
    pub stats_json: Option<PathBuf>,

    /// Start interactive REPL
    #[arg(short, long)]
    pub repl: bool,
}

impl Cli {
    /// Collector configuration selected by the flags.
    pub fn gc_config(&self) -> GcConfig {
        let mut config = GcConfig::default()
            .with_semispace_cells(self.semispace_cells)
            .with_roots(self.roots);

        match self.scan_quantum {
            Some(quantum) => {
                if self.mode == ModeArg::StopTheWorld {
                    warn!("--scan-quantum given, switching to incremental mode");
                }
                config = config
                    .with_mode(GcMode::Incremental)
                    .with_scan_quantum(usize::try_from(quantum).unwrap_or(usize::MAX));
            }
            None => config = config.with_mode(self.mode.into()),
        }
        config
    }

    /// Workload selected by the flags, with its parameter.
    pub fn workload(&self) -> Workload {
        match self.workload {
            WorkloadKind::Sieve => Workload::Sieve { limit: self.limit },
            WorkloadKind::Registers => Workload::Registers {
                rounds: self.rounds,
            },
            WorkloadKind::Churn => Workload::Churn { count: self.count },
        }
    }
}
