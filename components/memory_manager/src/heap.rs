//! Semispace pair management.
//!
//! The heap is one contiguous block of words split into two equally sized
//! semispaces. Exactly one of them is active (tospace) at a time; the other is
//! stale (fromspace). Inside the active space three cursors partition memory:
//!
//! ```text
//!   start        S            B                T           end
//!     | scanned  | unscanned  |     free       |   new     |
//! ```
//!
//! - Below `S`: live cells whose slots only refer into the active space
//! - `[S, B)`: live cells copied from the stale space but not yet scanned
//! - `[B, T)`: free area
//! - `[T, end)`: cells allocated by the mutator in incremental mode
//!
//! The invariant `S <= B <= T` with `T - B` a whole number of cells holds
//! between any two public operations.

use core_types::{Address, GcError, Value, Word, CELL_WORDS};
use log::{debug, warn};

/// Which half of the heap a semispace occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Words `[0, N)`
    Lower,
    /// Words `[N, 2N)`
    Upper,
}

impl Region {
    /// Returns the opposite half.
    pub fn other(self) -> Self {
        match self {
            Region::Lower => Region::Upper,
            Region::Upper => Region::Lower,
        }
    }
}

/// Bounds of one semispace, in word addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Semispace {
    start: Address,
    end: Address,
}

impl Semispace {
    /// First word of the semispace.
    pub fn start(&self) -> Address {
        self.start
    }

    /// One past the last word of the semispace.
    pub fn end(&self) -> Address {
        self.end
    }

    /// Returns whether `addr` falls inside this semispace.
    pub fn contains(&self, addr: Address) -> bool {
        self.start <= addr && addr < self.end
    }

    /// Size of the semispace in words.
    pub fn len_words(&self) -> usize {
        self.end.word() - self.start.word()
    }
}

/// The two slots of a cons cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// First slot
    Car = 0,
    /// Second slot
    Cdr = 1,
}

/// The semispace pair together with its scan, bottom and top cursors.
///
/// All cursor movement happens through this type. Mutators never write the
/// cursors; they go through [`crate::Collector`].
#[derive(Debug)]
pub struct Heap {
    /// Both semispaces, lower half first
    memory: Box<[Word]>,
    /// One flag per cell; set once a stale cell holds a forwarding address
    pub(crate) forwarded: Box<[bool]>,
    /// Capacity of one semispace in cells
    cells_per_space: usize,
    /// The semispace currently used for allocation and copying
    active: Region,
    /// S: first cell not yet scanned
    scan: Address,
    /// B: bottom of the free area
    bottom: Address,
    /// T: top of the free area
    top: Address,
    /// Cells copied out of the stale space since creation
    pub(crate) cells_copied: u64,
    /// Cells scanned since creation
    pub(crate) cells_scanned: u64,
}

impl Heap {
    /// Creates a heap whose semispaces each hold `cells_per_space` cells.
    ///
    /// The initial flip is performed here, so the lower half is active and
    /// empty when this returns.
    pub fn new(cells_per_space: usize) -> Self {
        let words = 2 * cells_per_space * CELL_WORDS;
        Self::with_storage(
            vec![Word::default(); words].into_boxed_slice(),
            vec![false; 2 * cells_per_space].into_boxed_slice(),
            cells_per_space,
        )
    }

    /// Like [`Heap::new`], but reports a failed allocation as
    /// [`GcError::InvalidConfig`] instead of aborting.
    pub fn try_new(cells_per_space: usize) -> Result<Self, GcError> {
        let too_large = || {
            GcError::InvalidConfig(format!(
                "cannot allocate two semispaces of {} cells",
                cells_per_space
            ))
        };
        let cells = cells_per_space.checked_mul(2).ok_or_else(too_large)?;
        let words = cells.checked_mul(CELL_WORDS).ok_or_else(too_large)?;

        let mut memory = Vec::new();
        memory.try_reserve_exact(words).map_err(|_| too_large())?;
        memory.resize(words, Word::default());
        let mut forwarded = Vec::new();
        forwarded.try_reserve_exact(cells).map_err(|_| too_large())?;
        forwarded.resize(cells, false);

        Ok(Self::with_storage(
            memory.into_boxed_slice(),
            forwarded.into_boxed_slice(),
            cells_per_space,
        ))
    }

    fn with_storage(memory: Box<[Word]>, forwarded: Box<[bool]>, cells_per_space: usize) -> Self {
        let mut heap = Heap {
            memory,
            forwarded,
            cells_per_space,
            active: Region::Upper,
            scan: Address::new(0),
            bottom: Address::new(0),
            top: Address::new(0),
            cells_copied: 0,
            cells_scanned: 0,
        };
        heap.flip();
        heap
    }

    /// Capacity of one semispace, in cells.
    pub fn capacity(&self) -> usize {
        self.cells_per_space
    }

    /// Total size of both semispaces, in words.
    pub fn total_words(&self) -> usize {
        self.memory.len()
    }

    /// Returns the bounds of the given half.
    pub fn space(&self, region: Region) -> Semispace {
        let half = self.cells_per_space * CELL_WORDS;
        let start = match region {
            Region::Lower => 0,
            Region::Upper => half,
        };
        Semispace {
            start: Address::new(start),
            end: Address::new(start + half),
        }
    }

    /// Which half is currently active.
    pub fn active_region(&self) -> Region {
        self.active
    }

    /// The active semispace (tospace).
    pub fn active(&self) -> Semispace {
        self.space(self.active)
    }

    /// The stale semispace (fromspace).
    pub fn stale(&self) -> Semispace {
        self.space(self.active.other())
    }

    /// Returns whether `addr` is inside the active semispace.
    pub fn in_active(&self, addr: Address) -> bool {
        self.active().contains(addr)
    }

    /// Returns whether `addr` is inside the stale semispace.
    pub fn in_stale(&self, addr: Address) -> bool {
        self.stale().contains(addr)
    }

    /// Returns whether `addr` is inside either semispace.
    pub fn in_heap(&self, addr: Address) -> bool {
        addr.word() < self.memory.len()
    }

    /// Returns whether `addr` names a cell that currently holds live data
    /// in the active semispace: copied or allocated, but not free.
    pub fn is_allocated(&self, addr: Address) -> bool {
        self.in_active(addr) && addr.is_cell_aligned() && (addr < self.bottom || addr >= self.top)
    }

    /// S, the scan cursor.
    pub fn scan_ptr(&self) -> Address {
        self.scan
    }

    /// B, the bottom of the free area.
    pub fn bottom(&self) -> Address {
        self.bottom
    }

    /// T, the top of the free area.
    pub fn top(&self) -> Address {
        self.top
    }

    /// Free cells between B and T.
    pub fn free_cells(&self) -> usize {
        (self.top.word() - self.bottom.word()) / CELL_WORDS
    }

    /// Cells copied but not yet scanned, `[S, B)`.
    pub fn unscanned_cells(&self) -> usize {
        (self.bottom.word() - self.scan.word()) / CELL_WORDS
    }

    /// Number of cells copied out of the stale space so far.
    pub fn cells_copied(&self) -> u64 {
        self.cells_copied
    }

    /// Number of cells scanned so far.
    pub fn cells_scanned(&self) -> u64 {
        self.cells_scanned
    }

    /// Interchanges the semispaces.
    ///
    /// The previously stale half becomes active and empty: `S = B = start`
    /// and `T = end`. Its forwarding flags are cleared since everything in it
    /// is now free memory.
    pub fn flip(&mut self) {
        self.active = self.active.other();
        let space = self.active();
        self.scan = space.start();
        self.bottom = space.start();
        self.top = space.end();

        let first = space.start().cell_index();
        let last = space.end().cell_index();
        self.forwarded[first..last].fill(false);

        debug!(
            "flip: {:?} semispace active, {} cells free",
            self.active,
            self.free_cells()
        );
    }

    /// Reads a slot without any forwarding.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is outside the heap.
    pub fn slot(&self, addr: Address, slot: Slot) -> Value {
        Value::from_word(self.memory[addr.word() + slot as usize])
    }

    /// Overwrites a slot.
    pub(crate) fn set_slot(&mut self, addr: Address, slot: Slot, value: Value) {
        self.memory[addr.word() + slot as usize] = value.to_word();
    }

    /// Copies both raw words of the cell at `from` into the cell at `to`.
    pub(crate) fn copy_words(&mut self, from: Address, to: Address) {
        let from = from.word();
        self.memory.copy_within(from..from + CELL_WORDS, to.word());
    }

    /// Takes the cell at B and advances B by one cell.
    pub(crate) fn alloc_bottom(&mut self) -> Result<Address, GcError> {
        if self.bottom >= self.top {
            return Err(self.exhausted());
        }
        let cell = self.bottom;
        self.bottom = cell.offset(CELL_WORDS);
        Ok(cell)
    }

    /// Lowers T by one cell and returns the cell just below the old T.
    pub(crate) fn alloc_top(&mut self) -> Result<Address, GcError> {
        if self.top <= self.bottom {
            return Err(self.exhausted());
        }
        self.top = self.top.back(CELL_WORDS);
        Ok(self.top)
    }

    /// Moves S past the cell it currently points at.
    pub(crate) fn advance_scan(&mut self) {
        self.scan = self.scan.offset(CELL_WORDS);
        self.cells_scanned += 1;
    }

    fn exhausted(&self) -> GcError {
        warn!(
            "heap exhausted: {} of {} cells in use",
            self.cells_per_space - self.free_cells(),
            self.cells_per_space
        );
        GcError::HeapExhausted {
            capacity: self.cells_per_space,
        }
    }

    /// Checks `S <= B <= T`, that `T - B` is whole cells, and that all three
    /// cursors lie in the active space.
    pub fn check_invariants(&self) -> Result<(), GcError> {
        let space = self.active();
        if !(space.start() <= self.scan && self.scan <= self.bottom) {
            return Err(GcError::InvariantViolation(format!(
                "scan cursor {} outside [{}, {}]",
                self.scan,
                space.start(),
                self.bottom
            )));
        }
        if !(self.bottom <= self.top && self.top <= space.end()) {
            return Err(GcError::InvariantViolation(format!(
                "bottom {} and top {} out of order in [{}, {}]",
                self.bottom,
                self.top,
                space.start(),
                space.end()
            )));
        }
        if (self.top.word() - self.bottom.word()) % CELL_WORDS != 0 {
            return Err(GcError::InvariantViolation(format!(
                "free area [{}, {}) is not cell aligned",
                self.bottom, self.top
            )));
        }
        Ok(())
    }
}
