//! Character-per-cell rendering of heap occupancy.
//!
//! Read-only observer for humans; rendering never touches collector state.

use std::fmt;

use core_types::{Address, CELL_WORDS};

use crate::collector::GcMode;
use crate::heap::Heap;

/// One line showing both semispaces, the cursors and every cell's state.
///
/// ```text
/// |  ++ + |rrSttB__Tn|
/// ```
pub struct HeapMap<'a> {
    heap: &'a Heap,
    mode: GcMode,
}

impl<'a> HeapMap<'a> {
    /// Explanation of the map characters.
    pub const LEGEND: &'static str = "\
S - Scan pointer
B - Free space for live objects
T - Allocation pointer (for new objects)
  - garbage
+ - moved to tospace
r - scanned
t - to be scanned
n - brand new
_ - free";

    /// Creates a map over `heap` interpreted for `mode`.
    pub fn new(heap: &'a Heap, mode: GcMode) -> Self {
        HeapMap { heap, mode }
    }

    fn cell_char(&self, cell: Address) -> char {
        let heap = self.heap;
        if heap.in_stale(cell) {
            return if heap.is_forwarded(cell) { '+' } else { ' ' };
        }
        match self.mode {
            _ if cell < heap.scan_ptr() => 'r',
            GcMode::Incremental if cell < heap.bottom() => 't',
            GcMode::Incremental if cell >= heap.top() => 'n',
            GcMode::StopTheWorld if cell < heap.bottom() => 'n',
            _ => '_',
        }
    }
}

impl fmt::Display for HeapMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heap = self.heap;
        let half = heap.capacity() * CELL_WORDS;
        let total = heap.total_words();

        let mut word = 0;
        loop {
            let cell = Address::new(word);
            if word == 0 || word == half || word == total {
                write!(f, "|")?;
            }
            if cell == heap.scan_ptr() {
                write!(f, "S")?;
            }
            if cell == heap.bottom() {
                write!(f, "B")?;
            }
            if cell == heap.top() {
                write!(f, "T")?;
            }
            if word >= total {
                break;
            }
            write!(f, "{}", self.cell_char(cell))?;
            word += CELL_WORDS;
        }
        Ok(())
    }
}
