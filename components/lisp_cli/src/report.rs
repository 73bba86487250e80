//! JSON run report

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use memory_manager::{GcConfig, GcMode, GcStats};
use serde::Serialize;

use crate::error::CliResult;
use crate::workloads::WorkloadOutput;

/// Collector settings as recorded in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigReport {
    /// Cells per semispace
    pub semispace_cells: usize,
    /// `incremental` or `stop-the-world`
    pub mode: &'static str,
    /// Scan quantum, absent in stop-the-world mode
    pub scan_quantum: Option<usize>,
    /// Number of roots
    pub roots: usize,
}

impl From<&GcConfig> for ConfigReport {
    fn from(config: &GcConfig) -> Self {
        let (mode, scan_quantum) = match config.mode {
            GcMode::Incremental => ("incremental", Some(config.scan_quantum)),
            GcMode::StopTheWorld => ("stop-the-world", None),
        };
        ConfigReport {
            semispace_cells: config.semispace_cells,
            mode,
            scan_quantum,
            roots: config.roots,
        }
    }
}

/// Collector counters as recorded in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    /// Collections started
    pub flips: u64,
    /// Cells handed out by cons
    pub cells_allocated: u64,
    /// Cells evacuated
    pub cells_copied: u64,
    /// Cells scanned
    pub cells_scanned: u64,
    /// Most cells scanned by a single cons
    pub max_scan_per_cons: u64,
}

impl From<GcStats> for StatsReport {
    fn from(stats: GcStats) -> Self {
        StatsReport {
            flips: stats.flips,
            cells_allocated: stats.cells_allocated,
            cells_copied: stats.cells_copied,
            cells_scanned: stats.cells_scanned,
            max_scan_per_cons: stats.max_scan_per_cons,
        }
    }
}

/// Summary of one workload run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Collector settings
    pub config: ConfigReport,
    /// Workload result, tagged with the workload name
    pub result: WorkloadOutput,
    /// Collector counters at the end of the run
    pub stats: StatsReport,
}

impl RunReport {
    /// Builds a report from a configuration, a result and final counters.
    pub fn new(config: &GcConfig, result: WorkloadOutput, stats: GcStats) -> Self {
        RunReport {
            config: config.into(),
            result,
            stats: stats.into(),
        }
    }

    /// Writes the report as pretty-printed JSON to `path`.
    pub fn write_to(&self, path: &Path) -> CliResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
