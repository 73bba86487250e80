//! Root set: the mutator's registers.
//!
//! A fixed number of value slots, the only externally supplied starting
//! points for reachability. Anything a mutator wants to survive the next
//! flip must be stored here (or inside a cell reachable from here).

use std::ops::{Index, IndexMut};

use core_types::{GcError, Value};

/// Fixed-capacity ordered table of root values.
///
/// # Examples
///
/// ```
/// use core_types::Value;
/// use memory_manager::RootSet;
///
/// let mut roots = RootSet::new(4);
/// roots[1] = Value::integer(7);
/// assert_eq!(roots.get(1), Some(Value::integer(7)));
/// assert_eq!(roots[0], Value::NIL);
/// assert_eq!(roots.get(4), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSet {
    slots: Box<[Value]>,
}

impl RootSet {
    /// Creates `capacity` roots, all holding the empty list.
    pub fn new(capacity: usize) -> Self {
        RootSet {
            slots: vec![Value::NIL; capacity].into_boxed_slice(),
        }
    }

    /// Number of roots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns whether there are no roots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reads root `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.slots.get(index).copied()
    }

    /// Iterates over the roots in order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.slots.iter()
    }

    /// Replaces every root with `relocate(root)`, in order.
    ///
    /// Stops at the first error; roots already visited keep their new value.
    pub fn relocate<F>(&mut self, mut relocate: F) -> Result<(), GcError>
    where
        F: FnMut(Value) -> Result<Value, GcError>,
    {
        for slot in self.slots.iter_mut() {
            *slot = relocate(*slot)?;
        }
        Ok(())
    }
}

impl Index<usize> for RootSet {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.slots[index]
    }
}

impl IndexMut<usize> for RootSet {
    fn index_mut(&mut self, index: usize) -> &mut Value {
        &mut self.slots[index]
    }
}
