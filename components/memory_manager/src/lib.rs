//! Memory Manager - Baker's real-time copying garbage collector
//!
//! This component provides:
//! - A semispace pair with scan, bottom and top cursors ([`Heap`])
//! - The forwarding/copy engine that migrates live cells exactly once
//! - A fixed-capacity root set ([`RootSet`])
//! - Cons allocation with bounded incremental scanning and the list
//!   accessors with a forwarding read barrier ([`Collector`])
//! - A read-only heap occupancy map for diagnostics ([`HeapMap`])
//!
//! Heap cells are fixed two-slot tuples; there are no larger objects.

pub mod collector;
pub mod gc;
pub mod heap;
pub mod heap_map;
pub mod roots;

// Re-export main types
pub use collector::{Collector, GcConfig, GcMode, GcStats};
pub use heap::{Heap, Region, Semispace, Slot};
pub use heap_map::HeapMap;
pub use roots::RootSet;
