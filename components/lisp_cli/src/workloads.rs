//! Built-in mutator programs
//!
//! Each workload keeps everything it needs in root registers, so any cons
//! may flip and relocate its data without the workload noticing.

use std::fmt;

use core_types::Value;
use log::info;
use serde::Serialize;

use crate::error::{CliError, CliResult};
use crate::runtime::Runtime;

/// A workload and its parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    /// Sieve of Eratosthenes over `2..=limit`
    Sieve {
        /// Largest candidate
        limit: isize,
    },
    /// Register stress with self-checks
    Registers {
        /// Number of mutation rounds
        rounds: usize,
    },
    /// Short-lived allocation only
    Churn {
        /// Number of cells allocated
        count: usize,
    },
}

/// What a workload produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "workload")]
pub enum WorkloadOutput {
    /// Primes found, ascending
    Sieve {
        /// The primes
        primes: Vec<isize>,
    },
    /// Registers workload summary
    Registers {
        /// Rounds completed
        rounds: usize,
        /// Identity checks passed
        checks: usize,
    },
    /// Churn workload summary
    Churn {
        /// Cells allocated
        cells: usize,
    },
}

impl fmt::Display for WorkloadOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadOutput::Sieve { primes } => {
                let text: Vec<String> = primes.iter().map(|p| p.to_string()).collect();
                write!(f, "primes: {}", text.join(" "))
            }
            WorkloadOutput::Registers { rounds, checks } => {
                write!(f, "registers: {} rounds, {} checks passed", rounds, checks)
            }
            WorkloadOutput::Churn { cells } => write!(f, "churn: {} cells allocated", cells),
        }
    }
}

impl Workload {
    /// Short name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            Workload::Sieve { .. } => "sieve",
            Workload::Registers { .. } => "registers",
            Workload::Churn { .. } => "churn",
        }
    }

    /// Runs the workload on `rt`.
    pub fn run(&self, rt: &mut Runtime) -> CliResult<WorkloadOutput> {
        info!("running {} workload", self.name());
        match *self {
            Workload::Sieve { limit } => Ok(WorkloadOutput::Sieve {
                primes: sieve(rt, limit)?,
            }),
            Workload::Registers { rounds } => Ok(WorkloadOutput::Registers {
                rounds,
                checks: registers(rt, rounds)?,
            }),
            Workload::Churn { count } => {
                churn(rt, count)?;
                Ok(WorkloadOutput::Churn { cells: count })
            }
        }
    }
}

fn require_roots(rt: &Runtime, needed: usize, workload: &str) -> CliResult<()> {
    if rt.root_count() < needed {
        return Err(CliError::Workload(format!(
            "{} needs at least {} roots, have {}",
            workload,
            needed,
            rt.root_count()
        )));
    }
    Ok(())
}

fn root(rt: &Runtime, index: usize) -> Value {
    rt.root(index).unwrap_or(Value::NIL)
}

/// Sieve of Eratosthenes on a heap list.
///
/// Registers: r0 holds the remaining candidates, r1 the cursor while
/// striking multiples, r2 the primes found (newest first).
pub fn sieve(rt: &mut Runtime, limit: isize) -> CliResult<Vec<isize>> {
    require_roots(rt, 3, "sieve")?;
    for i in 0..3 {
        rt.set_root(i, Value::NIL);
    }

    let mut n = limit;
    while n >= 2 {
        let candidates = root(rt, 0);
        let cell = rt.cons(Value::try_integer(n)?, candidates)?;
        rt.set_root(0, cell);
        n -= 1;
    }

    while !root(rt, 0).is_nil() {
        let head = root(rt, 0);
        let prime = rt.car(head)?.decode()?;

        // strike the multiples of `prime` from the rest of the list
        rt.set_root(1, head);
        loop {
            let cursor = root(rt, 1);
            let next = rt.cdr(cursor)?;
            if next.is_nil() {
                break;
            }
            let candidate = rt.car(next)?.decode()?;
            if candidate % prime == 0 {
                let after = rt.cdr(next)?;
                rt.rplacd(cursor, after)?;
            } else {
                rt.set_root(1, next);
            }
        }

        let found = root(rt, 2);
        let cell = rt.cons(Value::try_integer(prime)?, found)?;
        rt.set_root(2, cell);
        let head = root(rt, 0);
        let rest = rt.cdr(head)?;
        rt.set_root(0, rest);
    }
    rt.set_root(1, Value::NIL);

    let mut primes = Vec::new();
    let mut cursor = root(rt, 2);
    while !cursor.is_nil() {
        primes.push(rt.car(cursor)?.decode()?);
        cursor = rt.cdr(cursor)?;
    }
    primes.reverse();
    Ok(primes)
}

fn check(ok: bool, round: usize, what: &str) -> CliResult<()> {
    if ok {
        Ok(())
    } else {
        Err(CliError::Workload(format!("round {}: {}", round, what)))
    }
}

/// Register stress.
///
/// Every register above r0 holds a cell whose car is r0 and whose cdr is the
/// register below it. Each round re-conses the odd registers, then points
/// r0's car at r7 and its cdr at r9 and checks both writes are visible.
/// Returns the number of checks passed.
pub fn registers(rt: &mut Runtime, rounds: usize) -> CliResult<usize> {
    require_roots(rt, 10, "registers")?;
    let count = rt.root_count();

    let anchor = rt.cons(Value::integer(0), Value::NIL)?;
    rt.set_root(0, anchor);
    for i in 1..count {
        let (shared, previous) = (root(rt, 0), root(rt, i - 1));
        let cell = rt.cons(shared, previous)?;
        rt.set_root(i, cell);
    }

    let mut checks = 0;
    for round in 0..rounds {
        for i in (1..count).step_by(2) {
            let (shared, previous) = (root(rt, 0), root(rt, i - 1));
            let cell = rt.cons(shared, previous)?;
            rt.set_root(i, cell);
        }

        let r0 = root(rt, 0);
        let car = rt.car(r0)?;
        check(!rt.eq(car, root(rt, 7)), round, "car of r0 is already r7")?;
        rt.rplaca(r0, root(rt, 7))?;
        let car = rt.car(r0)?;
        check(rt.eq(car, root(rt, 7)), round, "car of r0 is not r7 after rplaca")?;

        let cdr = rt.cdr(r0)?;
        check(!rt.eq(cdr, root(rt, 9)), round, "cdr of r0 is already r9")?;
        rt.rplacd(r0, root(rt, 9))?;
        let cdr = rt.cdr(r0)?;
        check(rt.eq(cdr, root(rt, 9)), round, "cdr of r0 is not r9 after rplacd")?;

        checks += 4;
    }
    Ok(checks)
}

/// Allocates `count` cells of `(1 . 2)`, cycling through the registers so
/// that only the most recent `roots` cells stay live.
pub fn churn(rt: &mut Runtime, count: usize) -> CliResult<()> {
    require_roots(rt, 1, "churn")?;
    let registers = rt.root_count();
    for i in 0..count {
        let cell = rt.cons(Value::integer(1), Value::integer(2))?;
        rt.set_root(i % registers, cell);
    }
    Ok(())
}
