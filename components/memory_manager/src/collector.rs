//! Cell allocator and list accessors.
//!
//! [`Collector`] owns the semispace pair and the root set and is the only
//! way mutators touch the heap. Every [`Collector::cons`] may flip the
//! semispaces and performs a bounded amount of scanning, so no single call
//! pays for a whole collection in incremental mode.

use core_types::{Address, GcError, Value, CELL_WORDS};
use log::debug;

use crate::heap::{Heap, Slot};
use crate::heap_map::HeapMap;
use crate::roots::RootSet;

/// How collection work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GcMode {
    /// Baker's real-time variant: K scan steps per cons, read barrier on
    /// car/cdr, new cells taken from the top of the free area
    #[default]
    Incremental,
    /// Trace everything at flip time, new cells taken from the bottom
    StopTheWorld,
}

/// Construction-time collector configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcConfig {
    /// Capacity of one semispace, in cells
    pub semispace_cells: usize,
    /// Scheduling mode
    pub mode: GcMode,
    /// Cells scanned per cons in incremental mode (K)
    pub scan_quantum: usize,
    /// Number of roots
    pub roots: usize,
}

impl Default for GcConfig {
    fn default() -> Self {
        GcConfig {
            semispace_cells: 128,
            mode: GcMode::Incremental,
            scan_quantum: 4,
            roots: 32,
        }
    }
}

impl GcConfig {
    /// Largest accepted semispace, in cells (512 MiB of cells for the pair
    /// on a 64-bit target).
    pub const MAX_SEMISPACE_CELLS: usize = 1 << 24;

    /// Sets the capacity of one semispace.
    pub fn with_semispace_cells(mut self, cells: usize) -> Self {
        self.semispace_cells = cells;
        self
    }

    /// Sets the scheduling mode.
    pub fn with_mode(mut self, mode: GcMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the scan quantum K.
    pub fn with_scan_quantum(mut self, quantum: usize) -> Self {
        self.scan_quantum = quantum;
        self
    }

    /// Sets the number of roots.
    pub fn with_roots(mut self, roots: usize) -> Self {
        self.roots = roots;
        self
    }

    /// Scan steps allowed per cons: K when incremental, everything that
    /// remains when stop-the-world.
    pub fn effective_quantum(&self) -> usize {
        match self.mode {
            GcMode::Incremental => self.scan_quantum,
            GcMode::StopTheWorld => usize::MAX,
        }
    }

    /// Rejects configurations the collector cannot run with.
    pub fn validate(&self) -> Result<(), GcError> {
        if self.scan_quantum == 0 {
            return Err(GcError::InvalidConfig(
                "scan quantum must be at least 1".to_string(),
            ));
        }
        if self.roots == 0 {
            return Err(GcError::InvalidConfig(
                "root set must hold at least one value".to_string(),
            ));
        }
        let words = self
            .semispace_cells
            .checked_mul(2 * CELL_WORDS)
            .filter(|words| *words < Address::MAX);
        if words.is_none() {
            return Err(GcError::InvalidConfig(format!(
                "semispace of {} cells is not addressable",
                self.semispace_cells
            )));
        }
        if self.semispace_cells > Self::MAX_SEMISPACE_CELLS {
            return Err(GcError::InvalidConfig(format!(
                "semispace of {} cells exceeds the limit of {}",
                self.semispace_cells,
                Self::MAX_SEMISPACE_CELLS
            )));
        }
        Ok(())
    }
}

/// Counters describing collector activity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GcStats {
    /// Flips caused by allocation (the initial flip is not counted)
    pub flips: u64,
    /// Cells handed out by cons
    pub cells_allocated: u64,
    /// Cells copied from the stale to the active space
    pub cells_copied: u64,
    /// Cells scanned
    pub cells_scanned: u64,
    /// Largest number of cells scanned inside a single cons
    pub max_scan_per_cons: u64,
}

/// Baker's real-time copying collector over fixed two-slot cells.
///
/// # Examples
///
/// ```
/// use core_types::Value;
/// use memory_manager::{Collector, GcConfig};
///
/// let mut gc = Collector::new(GcConfig::default().with_semispace_cells(16)).unwrap();
/// let list = gc.cons(Value::integer(1), Value::NIL).unwrap();
/// gc.set_root(0, list);
///
/// let list = gc.root(0);
/// assert_eq!(gc.car(list).unwrap(), Value::integer(1));
/// let tail = gc.cdr(list).unwrap();
/// assert!(gc.is_atom(tail));
/// ```
#[derive(Debug)]
pub struct Collector {
    config: GcConfig,
    heap: Heap,
    roots: RootSet,
    stats: GcStats,
}

impl Collector {
    /// Creates a collector with an empty, freshly flipped heap.
    pub fn new(config: GcConfig) -> Result<Self, GcError> {
        config.validate()?;
        debug!(
            "collector: {} cells per semispace, {:?}, K = {}, {} roots",
            config.semispace_cells, config.mode, config.scan_quantum, config.roots
        );
        Ok(Collector {
            heap: Heap::try_new(config.semispace_cells)?,
            roots: RootSet::new(config.roots),
            stats: GcStats::default(),
            config,
        })
    }

    /// The configuration this collector was built with.
    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    /// Read-only view of the semispaces and cursors.
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// The root set.
    pub fn roots(&self) -> &RootSet {
        &self.roots
    }

    /// Mutable access to the root set.
    pub fn roots_mut(&mut self) -> &mut RootSet {
        &mut self.roots
    }

    /// Reads root `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn root(&self, index: usize) -> Value {
        self.roots[index]
    }

    /// Stores `value` in root `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set_root(&mut self, index: usize, value: Value) {
        self.roots[index] = value;
    }

    /// Activity counters.
    pub fn stats(&self) -> GcStats {
        GcStats {
            cells_copied: self.heap.cells_copied(),
            cells_scanned: self.heap.cells_scanned(),
            ..self.stats
        }
    }

    /// Renders the heap occupancy map.
    pub fn heap_map(&self) -> HeapMap<'_> {
        HeapMap::new(&self.heap, self.config.mode)
    }

    fn is_incremental(&self) -> bool {
        self.config.mode == GcMode::Incremental
    }

    /// Allocates the cell `(x . y)`.
    ///
    /// When the free area is used up the semispaces are flipped and the roots
    /// and both arguments are moved. In incremental mode up to K cells are
    /// then scanned; in stop-the-world mode the flip traces everything.
    pub fn cons(&mut self, x: Value, y: Value) -> Result<Value, GcError> {
        let (mut x, mut y) = (x.checked()?, y.checked()?);
        let scanned_before = self.heap.cells_scanned();

        if self.heap.bottom() == self.heap.top() {
            // unscanned cells in [S, B) may still reference the stale space,
            // which the flip is about to hand back for reuse
            if self.is_incremental() {
                self.heap.scan(usize::MAX)?;
            }
            (x, y) = self.collect(x, y)?;
        }

        if self.is_incremental() {
            self.heap.scan(self.config.effective_quantum())?;
        }

        let cell = match self.config.mode {
            GcMode::Incremental => self.heap.alloc_top()?,
            GcMode::StopTheWorld => self.heap.alloc_bottom()?,
        };
        self.heap.set_slot(cell, Slot::Car, x);
        self.heap.set_slot(cell, Slot::Cdr, y);

        self.stats.cells_allocated += 1;
        let scanned = self.heap.cells_scanned() - scanned_before;
        self.stats.max_scan_per_cons = self.stats.max_scan_per_cons.max(scanned);
        self.heap.check_invariants()?;
        Ok(Value::HeapRef(cell))
    }

    /// Flips, then moves every root and the pending cons arguments.
    fn collect(&mut self, x: Value, y: Value) -> Result<(Value, Value), GcError> {
        self.heap.flip();
        self.stats.flips += 1;

        let heap = &mut self.heap;
        self.roots.relocate(|root| heap.forward(root))?;
        let x = self.heap.forward(x)?;
        let y = self.heap.forward(y)?;

        if !self.is_incremental() {
            self.heap.scan(self.config.effective_quantum())?;
        }

        debug!(
            "collection {}: {} cells carried over, {} free",
            self.stats.flips,
            (self.heap.bottom().word() - self.heap.active().start().word()) / CELL_WORDS,
            self.heap.free_cells()
        );
        Ok((x, y))
    }

    /// Moves `value` out of the stale space if needed (see [`Heap::forward`]).
    pub fn forward(&mut self, value: Value) -> Result<Value, GcError> {
        self.heap.forward(value)
    }

    /// Resolves the receiver of an accessor to a live cell address.
    fn receiver(&mut self, x: Value) -> Result<Address, GcError> {
        let x = if self.is_incremental() {
            self.heap.forward(x)?
        } else {
            x
        };
        match x {
            Value::HeapRef(addr) if self.heap.is_allocated(addr) => Ok(addr),
            _ => Err(GcError::type_violation("cell in the active semispace", x)),
        }
    }

    fn read(&mut self, x: Value, slot: Slot) -> Result<Value, GcError> {
        let cell = self.receiver(x)?;
        let value = self.heap.slot(cell, slot);
        if self.is_incremental() {
            self.heap.forward(value)
        } else {
            Ok(value)
        }
    }

    fn write(&mut self, x: Value, slot: Slot, y: Value) -> Result<(), GcError> {
        let y = y.checked()?;
        let cell = self.receiver(x)?;
        self.heap.set_slot(cell, slot, y);
        Ok(())
    }

    /// First slot of `x`. In incremental mode the result is forwarded.
    pub fn car(&mut self, x: Value) -> Result<Value, GcError> {
        self.read(x, Slot::Car)
    }

    /// Second slot of `x`. In incremental mode the result is forwarded.
    pub fn cdr(&mut self, x: Value) -> Result<Value, GcError> {
        self.read(x, Slot::Cdr)
    }

    /// Overwrites the first slot of `x` with `y`.
    pub fn rplaca(&mut self, x: Value, y: Value) -> Result<(), GcError> {
        self.write(x, Slot::Car, y)
    }

    /// Overwrites the second slot of `x` with `y`.
    pub fn rplacd(&mut self, x: Value, y: Value) -> Result<(), GcError> {
        self.write(x, Slot::Cdr, y)
    }

    /// Identity of two values as currently represented.
    ///
    /// Only meaningful between flips unless both sides were read through
    /// the accessors or the root set.
    pub fn eq(&self, x: Value, y: Value) -> bool {
        x == y
    }

    /// True for integers and for references outside both semispaces.
    pub fn is_atom(&self, x: Value) -> bool {
        match x {
            Value::SmallInt(_) => true,
            Value::HeapRef(addr) => !self.heap.in_heap(addr),
        }
    }

    /// Checks the cursor invariants.
    pub fn check_invariants(&self) -> Result<(), GcError> {
        self.heap.check_invariants()
    }
}
