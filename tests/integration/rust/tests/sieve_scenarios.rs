//! Sieve scenarios
//!
//! The prime sieve is the reference mutator: it keeps all of its state in
//! registers, rewires cdr links while striking multiples and allocates the
//! result list as it goes. Every configuration below must reproduce the
//! primes exactly.

use lisp_cli::workloads::sieve;
use lisp_cli::Runtime;
use memory_manager::{GcConfig, GcMode};

const PRIMES_TO_50: [isize; 15] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];

fn primes_with(config: GcConfig) -> (Vec<isize>, u64) {
    let mut rt = Runtime::new(config).unwrap();
    let primes = sieve(&mut rt, 50).unwrap();
    (primes, rt.stats().flips)
}

#[test]
fn test_stop_the_world_sizes() {
    for cells in [52, 56, 64, 80, 128] {
        let config = GcConfig::default()
            .with_semispace_cells(cells)
            .with_mode(GcMode::StopTheWorld);
        let (primes, _) = primes_with(config);
        assert_eq!(primes, PRIMES_TO_50, "{} cells", cells);
    }
}

#[test]
fn test_incremental_sizes_and_quanta() {
    for (cells, quantum) in [(56, 4), (60, 2), (64, 1), (100, 4), (160, 1), (128, 64)] {
        let config = GcConfig::default()
            .with_semispace_cells(cells)
            .with_scan_quantum(quantum);
        let (primes, _) = primes_with(config);
        assert_eq!(primes, PRIMES_TO_50, "{} cells, K = {}", cells, quantum);
    }
}

#[test]
fn test_small_heaps_actually_collect() {
    let (_, flips) = primes_with(
        GcConfig::default()
            .with_semispace_cells(52)
            .with_mode(GcMode::StopTheWorld),
    );
    assert!(flips > 0);

    let (_, flips) = primes_with(
        GcConfig::default()
            .with_semispace_cells(56)
            .with_scan_quantum(4),
    );
    assert!(flips > 0);
}

#[test]
fn test_incremental_scan_work_is_bounded() {
    let config = GcConfig::default()
        .with_semispace_cells(60)
        .with_scan_quantum(2);
    let mut rt = Runtime::new(config).unwrap();
    sieve(&mut rt, 50).unwrap();
    assert!(rt.stats().max_scan_per_cons <= 2);
}

#[test]
fn test_repeated_sieves_reuse_the_heap() {
    let config = GcConfig::default()
        .with_semispace_cells(64)
        .with_scan_quantum(4);
    let mut rt = Runtime::new(config).unwrap();
    for _ in 0..20 {
        assert_eq!(sieve(&mut rt, 50).unwrap(), PRIMES_TO_50);
    }
    assert!(rt.stats().flips >= 10);
}
