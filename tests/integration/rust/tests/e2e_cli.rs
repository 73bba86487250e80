//! End-to-End CLI Integration Tests
//!
//! Drives the collector from parsed command-line arguments through the
//! lisp_cli Runtime API, the same path the binary takes.

use clap::Parser as ClapParser;
use lisp_cli::{Cli, CliError, RunReport, Runtime, WorkloadOutput};
use tempfile::TempDir;

fn run(args: &[&str]) -> Result<(WorkloadOutput, Runtime), CliError> {
    let cli = Cli::try_parse_from(args).expect("arguments should parse");
    let mut runtime = Runtime::new(cli.gc_config())?;
    let output = runtime.run(&cli.workload())?;
    Ok((output, runtime))
}

/// Test: default invocation runs the sieve
#[test]
fn test_e2e_default_sieve() {
    let (output, _) = run(&["baker-gc"]).expect("Execution failed");
    assert_eq!(
        output.to_string(),
        "primes: 2 3 5 7 11 13 17 19 23 29 31 37 41 43 47"
    );
}

/// Test: small stop-the-world heap
#[test]
fn test_e2e_stop_the_world() {
    let (output, runtime) =
        run(&["baker-gc", "-m", "stop-the-world", "-s", "56"]).expect("Execution failed");
    assert!(matches!(output, WorkloadOutput::Sieve { ref primes } if primes.len() == 15));
    assert!(runtime.stats().flips > 0);
}

/// Test: registers workload with an explicit quantum
#[test]
fn test_e2e_registers() {
    let args = ["baker-gc", "-w", "registers", "--rounds", "25", "-k", "8"];
    let (output, runtime) = run(&args).expect("Execution failed");
    assert_eq!(output.to_string(), "registers: 25 rounds, 100 checks passed");
    assert!(runtime.stats().max_scan_per_cons <= 8);
}

/// Test: a heap too small for the workload reports exhaustion
#[test]
fn test_e2e_out_of_memory() {
    let err = run(&["baker-gc", "-s", "10"]).err().expect("should run out of memory");
    assert!(err.is_fatal());
    assert!(err.to_string().contains("out of memory"));
}

/// Test: a root set too small for the workload
#[test]
fn test_e2e_registers_needs_roots() {
    let err = run(&["baker-gc", "-w", "registers", "--roots", "4"])
        .err()
        .expect("should be rejected");
    assert!(matches!(err, CliError::Workload(_)));
}

/// Test: configuration rejected by the collector
#[test]
fn test_e2e_invalid_config() {
    let err = run(&["baker-gc", "--roots", "0"]).err().expect("should be rejected");
    assert!(matches!(err, CliError::Gc(_)));
}

/// Test: an oversized heap is a configuration error, not an abort
#[test]
fn test_e2e_oversized_heap() {
    let err = run(&["baker-gc", "-s", "1000000000000000"])
        .err()
        .expect("should be rejected");
    assert!(matches!(err, CliError::Gc(_)));
    assert!(err.to_string().starts_with("invalid configuration"));
}

/// Test: --stats-json writes a report
#[test]
fn test_e2e_stats_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("churn.json");
    let path_arg = path.to_str().unwrap();

    let args = [
        "baker-gc", "-w", "churn", "--count", "500", "-s", "48", "--stats-json", path_arg,
    ];
    let cli = Cli::try_parse_from(args).unwrap();
    let config = cli.gc_config();
    let (output, runtime) = run(&args).expect("Execution failed");
    RunReport::new(&config, output, runtime.stats())
        .write_to(cli.stats_json.as_deref().unwrap())
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["result"]["workload"], "churn");
    assert_eq!(json["result"]["cells"], 500);
    assert_eq!(json["stats"]["cells_allocated"], 500);
    assert!(json["stats"]["flips"].as_u64().unwrap() > 0);
}
