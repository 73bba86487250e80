//! Runtime orchestration for list programs
//!
//! The Runtime wraps a [`Collector`] and adds what a driver needs on top of
//! the raw accessor API:
//! - optional heap map tracing after every allocation
//! - printing of list structure
//! - running the built-in workloads

use core_types::Value;
use memory_manager::{Collector, GcConfig, GcStats};

use crate::error::CliResult;
use crate::workloads::{Workload, WorkloadOutput};

/// Longest list printed before eliding the rest
const MAX_PRINT_LENGTH: usize = 64;

/// Deepest nesting printed before eliding
const MAX_PRINT_DEPTH: usize = 16;

/// Mutator front end over a single collector instance
pub struct Runtime {
    gc: Collector,
    /// Whether to print a heap map after each cons
    trace_heap: bool,
}

impl Runtime {
    /// Create a new runtime over a fresh heap
    ///
    /// # Errors
    /// Returns `CliError::Gc` if `config` is rejected by the collector
    ///
    /// # Example
    /// ```
    /// use lisp_cli::Runtime;
    /// use memory_manager::GcConfig;
    ///
    /// let runtime = Runtime::new(GcConfig::default()).unwrap();
    /// assert_eq!(runtime.stats().flips, 0);
    /// ```
    pub fn new(config: GcConfig) -> CliResult<Self> {
        Ok(Self {
            gc: Collector::new(config)?,
            trace_heap: false,
        })
    }

    /// Enable heap map tracing
    pub fn with_heap_map(mut self, enabled: bool) -> Self {
        self.trace_heap = enabled;
        self
    }

    /// The underlying collector
    pub fn collector(&self) -> &Collector {
        &self.gc
    }

    /// Collector statistics so far
    pub fn stats(&self) -> GcStats {
        self.gc.stats()
    }

    /// Number of root registers
    pub fn root_count(&self) -> usize {
        self.gc.roots().len()
    }

    /// Reads register `index`; `None` if it does not exist.
    pub fn root(&self, index: usize) -> Option<Value> {
        self.gc.roots().get(index)
    }

    /// Writes register `index`.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn set_root(&mut self, index: usize, value: Value) {
        self.gc.set_root(index, value);
    }

    /// Allocates a cell, tracing the heap afterwards if enabled.
    pub fn cons(&mut self, x: Value, y: Value) -> CliResult<Value> {
        let cell = self.gc.cons(x, y)?;
        if self.trace_heap {
            println!("{}", self.gc.heap_map());
        }
        Ok(cell)
    }

    /// First slot of `x`.
    pub fn car(&mut self, x: Value) -> CliResult<Value> {
        Ok(self.gc.car(x)?)
    }

    /// Second slot of `x`.
    pub fn cdr(&mut self, x: Value) -> CliResult<Value> {
        Ok(self.gc.cdr(x)?)
    }

    /// Overwrites the first slot of `x`.
    pub fn rplaca(&mut self, x: Value, y: Value) -> CliResult<()> {
        Ok(self.gc.rplaca(x, y)?)
    }

    /// Overwrites the second slot of `x`.
    pub fn rplacd(&mut self, x: Value, y: Value) -> CliResult<()> {
        Ok(self.gc.rplacd(x, y)?)
    }

    /// Identity comparison.
    pub fn eq(&self, x: Value, y: Value) -> bool {
        self.gc.eq(x, y)
    }

    /// Whether `x` is not a cell.
    pub fn is_atom(&self, x: Value) -> bool {
        self.gc.is_atom(x)
    }

    /// Runs `workload` to completion.
    pub fn run(&mut self, workload: &Workload) -> CliResult<WorkloadOutput> {
        workload.run(self)
    }

    /// Prints `value` as a list expression.
    ///
    /// Proper lists print as `(1 2 3)`, improper tails as `(1 . 2)`. Long or
    /// deeply nested (possibly cyclic) structure is cut off with `...`.
    /// Reading goes through `car`/`cdr`, so in incremental mode printing may
    /// copy cells out of the stale space like any other access.
    pub fn render(&mut self, value: Value) -> CliResult<String> {
        let mut out = String::new();
        self.render_into(value, 0, &mut out)?;
        Ok(out)
    }

    fn render_into(&mut self, value: Value, depth: usize, out: &mut String) -> CliResult<()> {
        if self.gc.is_atom(value) {
            out.push_str(&value.to_string());
            return Ok(());
        }
        if depth >= MAX_PRINT_DEPTH {
            out.push_str("(...)");
            return Ok(());
        }

        out.push('(');
        let mut cursor = value;
        let mut length = 0;
        loop {
            if length == MAX_PRINT_LENGTH {
                out.push_str(" ...");
                break;
            }
            if length > 0 {
                out.push(' ');
            }
            let head = self.gc.car(cursor)?;
            self.render_into(head, depth + 1, out)?;
            length += 1;

            let tail = self.gc.cdr(cursor)?;
            if tail.is_nil() {
                break;
            }
            if self.gc.is_atom(tail) {
                out.push_str(" . ");
                out.push_str(&tail.to_string());
                break;
            }
            cursor = tail;
        }
        out.push(')');
        Ok(())
    }
}
