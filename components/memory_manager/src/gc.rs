//! Forwarding and copying engine for Baker's real-time collector.
//!
//! This is the Minsky-Fenichel-Yochelson-Cheney copying scheme made
//! incremental:
//! - [`Heap::forward`] migrates a stale cell into the active space exactly
//!   once, leaving a forwarding address behind
//! - [`Heap::copy_cell`] places the copy at B, the bottom of the free area
//! - [`Heap::scan_cell`] and [`Heap::scan`] advance S over copied cells,
//!   forwarding whatever their slots still reference in the stale space
//!
//! A copied cell keeps its original slot contents, which may still point into
//! the stale space. Those are fixed up later by the scanner, or on demand by
//! the read barrier in [`crate::Collector::car`] / [`crate::Collector::cdr`].
//!
//! Like the classic algorithm, the forwarding address overwrites the stale
//! cell's first slot. Whether that slot holds a forwarding address is decided
//! by a dedicated per-cell flag rather than by inspecting the payload, so a
//! value that happens to point into the active space can never be mistaken
//! for a forwarding marker.

use core_types::{Address, GcError, Value};
use log::trace;

use crate::heap::{Heap, Slot};

impl Heap {
    /// Returns whether the stale cell at `addr` has already been copied.
    pub fn is_forwarded(&self, addr: Address) -> bool {
        self.in_heap(addr) && addr.is_cell_aligned() && self.forwarded[addr.cell_index()]
    }

    /// Returns the forwarding address left in the cell at `addr`, if any.
    pub fn forwarding_address(&self, addr: Address) -> Option<Address> {
        if self.is_forwarded(addr) {
            self.slot(addr, Slot::Car).as_address()
        } else {
            None
        }
    }

    /// Moves `value` into the active space if it still references the stale
    /// space, and returns its current representation.
    ///
    /// Integers, sentinels outside the heap and references already in the
    /// active space are returned unchanged. A stale reference is copied on
    /// first use and resolved through its forwarding address afterwards, so
    /// calling this twice on the same value yields the same address and
    /// copies at most once.
    pub fn forward(&mut self, value: Value) -> Result<Value, GcError> {
        let addr = match value {
            Value::HeapRef(addr) if self.in_stale(addr) => addr,
            _ => return Ok(value),
        };

        if !addr.is_cell_aligned() {
            return Err(GcError::InvariantViolation(format!(
                "reference {} into the stale space is not cell aligned",
                addr
            )));
        }

        if self.forwarded[addr.cell_index()] {
            return match self.slot(addr, Slot::Car) {
                Value::HeapRef(to) if self.in_active(to) => Ok(Value::HeapRef(to)),
                other => Err(GcError::InvariantViolation(format!(
                    "forwarding marker of {} holds {:?}, outside the active space",
                    addr, other
                ))),
            };
        }

        let to = self.copy_cell(addr)?;
        self.set_slot(addr, Slot::Car, Value::HeapRef(to));
        self.forwarded[addr.cell_index()] = true;
        trace!("forwarded {} -> {}", addr, to);
        Ok(Value::HeapRef(to))
    }

    /// Copies both slots of the cell at `from` verbatim to B and advances B.
    ///
    /// Returns the address of the copy. Fails with
    /// [`GcError::HeapExhausted`] when the free area is used up.
    pub fn copy_cell(&mut self, from: Address) -> Result<Address, GcError> {
        if !self.in_heap(from) || !from.is_cell_aligned() {
            return Err(GcError::type_violation("cell", Value::HeapRef(from)));
        }
        let to = self.alloc_bottom()?;
        self.copy_words(from, to);
        self.cells_copied += 1;
        Ok(to)
    }

    /// Scans the cell at S: forwards both slots in place and advances S.
    pub fn scan_cell(&mut self) -> Result<(), GcError> {
        let cell = self.scan_ptr();
        if cell >= self.bottom() {
            return Err(GcError::InvariantViolation(format!(
                "scan cursor {} has no unscanned cell below {}",
                cell,
                self.bottom()
            )));
        }
        for slot in [Slot::Car, Slot::Cdr] {
            let value = self.forward(self.slot(cell, slot))?;
            self.set_slot(cell, slot, value);
        }
        self.advance_scan();
        Ok(())
    }

    /// Performs up to `quantum` scan steps, stopping early once S reaches B.
    ///
    /// Cells copied by these steps extend `[S, B)` and are picked up by the
    /// same loop. Pass `usize::MAX` to trace until the active space is
    /// closed. Returns the number of cells scanned.
    pub fn scan(&mut self, quantum: usize) -> Result<usize, GcError> {
        let mut scanned = 0;
        while scanned < quantum && self.scan_ptr() < self.bottom() {
            self.scan_cell()?;
            scanned += 1;
        }
        Ok(scanned)
    }
}
