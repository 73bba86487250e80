//! Collector property tests
//!
//! Checks the collector's guarantees through the public Collector API:
//! reachability after a flip, integer fidelity, forwarding, cursor
//! ordering, exhaustion and mutation across collections.

use core_types::{Address, ErrorKind, Value, SMALL_INT_MAX, SMALL_INT_MIN};
use integration_tests::reachable_cells;
use memory_manager::{Collector, GcConfig, GcMode};

fn collector(cells: usize, mode: GcMode) -> Collector {
    Collector::new(
        GcConfig::default()
            .with_semispace_cells(cells)
            .with_mode(mode),
    )
    .unwrap()
}

/// Conses a proper list of `items` into root `root`.
fn build_list(gc: &mut Collector, root: usize, items: &[isize]) {
    gc.set_root(root, Value::NIL);
    for &item in items.iter().rev() {
        let cell = gc.cons(Value::integer(item), gc.root(root)).unwrap();
        gc.set_root(root, cell);
    }
}

/// Reads the list in root `root` back through car/cdr.
fn read_list(gc: &mut Collector, root: usize) -> Vec<isize> {
    let mut items = Vec::new();
    let mut cursor = gc.root(root);
    while !cursor.is_nil() {
        items.push(gc.car(cursor).unwrap().decode().unwrap());
        cursor = gc.cdr(cursor).unwrap();
    }
    items
}

/// Allocates unreferenced cells until `done` holds.
fn churn_until(gc: &mut Collector, mut done: impl FnMut(&Collector) -> bool) {
    for _ in 0..10_000 {
        if done(gc) {
            return;
        }
        gc.cons(Value::integer(0), Value::integer(0)).unwrap();
    }
    panic!("condition never reached");
}

#[test]
fn test_stop_the_world_flip_closes_reachable_set() {
    let mut gc = collector(16, GcMode::StopTheWorld);
    build_list(&mut gc, 0, &[1, 2, 3, 4, 5]);
    build_list(&mut gc, 1, &[6, 7]);

    churn_until(&mut gc, |gc| gc.stats().flips == 1);

    let heap = gc.heap();
    let live = reachable_cells(heap, gc.roots().iter());
    assert_eq!(live.len(), 7);
    assert!(live.iter().all(|&addr| heap.in_active(addr)));
}

#[test]
fn test_incremental_reachable_set_closed_once_scan_finishes() {
    let mut gc = Collector::new(
        GcConfig::default()
            .with_semispace_cells(24)
            .with_scan_quantum(2),
    )
    .unwrap();
    build_list(&mut gc, 0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);

    churn_until(&mut gc, |gc| gc.stats().flips == 1);
    let heap = gc.heap();
    assert!(gc
        .roots()
        .iter()
        .filter_map(|root| root.as_address())
        .all(|addr| !heap.in_stale(addr)));

    churn_until(&mut gc, |gc| gc.heap().unscanned_cells() == 0);
    let heap = gc.heap();
    let live = reachable_cells(heap, gc.roots().iter());
    assert_eq!(live.len(), 10);
    assert!(live.iter().all(|&addr| heap.in_active(addr)));
    assert_eq!(read_list(&mut gc, 0), (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_integers_round_trip_through_cells_and_flips() {
    let samples = [SMALL_INT_MIN, -1, 0, 1, 42, SMALL_INT_MAX];
    for mode in [GcMode::Incremental, GcMode::StopTheWorld] {
        let mut gc = collector(16, mode);
        build_list(&mut gc, 0, &samples);
        churn_until(&mut gc, |gc| gc.stats().flips >= 2);
        assert_eq!(read_list(&mut gc, 0), samples);
    }
    assert!(Value::try_integer(SMALL_INT_MAX + 1).is_err());
    assert!(Value::try_integer(SMALL_INT_MIN - 1).is_err());
}

#[test]
fn test_forwarding_is_idempotent() {
    let mut gc = collector(4, GcMode::Incremental);
    let rooted = gc.cons(Value::integer(1), Value::NIL).unwrap();
    gc.set_root(0, rooted);
    let unrooted = gc.cons(Value::integer(2), Value::NIL).unwrap();

    churn_until(&mut gc, |gc| gc.stats().flips == 1);

    // the rooted cell was moved by the flip; forwarding its old name finds it
    let copied = gc.stats().cells_copied;
    assert_eq!(gc.forward(rooted).unwrap(), gc.root(0));
    assert_eq!(gc.forward(rooted).unwrap(), gc.root(0));
    assert_eq!(gc.stats().cells_copied, copied);

    // the unrooted cell is copied exactly once
    let first = gc.forward(unrooted).unwrap();
    let second = gc.forward(unrooted).unwrap();
    assert_eq!(first, second);
    assert_ne!(first, unrooted);
    assert_eq!(gc.stats().cells_copied, copied + 1);
    assert_eq!(gc.car(first).unwrap(), Value::integer(2));
}

#[test]
fn test_cursor_order_holds_after_every_cons() {
    for mode in [GcMode::Incremental, GcMode::StopTheWorld] {
        let mut gc = collector(24, mode);
        for i in 0..500usize {
            // chains of at most four cells, eight of them live at a time
            let keep = if i % 4 == 0 {
                Value::NIL
            } else {
                gc.root((i - 1) % 8)
            };
            let cell = gc.cons(Value::integer(i as isize), keep).unwrap();
            gc.set_root(i % 8, cell);

            let heap = gc.heap();
            assert!(heap.scan_ptr() <= heap.bottom());
            assert!(heap.bottom() <= heap.top());
            assert_eq!((heap.top().word() - heap.bottom().word()) % 2, 0);
            gc.check_invariants().unwrap();
        }
        assert!(gc.stats().flips > 0);
    }
}

#[test]
fn test_exhaustion_is_deterministic() {
    fn fail_step(mode: GcMode) -> (usize, ErrorKind) {
        fail_step_with(
            GcConfig::default()
                .with_semispace_cells(12)
                .with_mode(mode),
        )
    }

    fn fail_step_with(config: GcConfig) -> (usize, ErrorKind) {
        let mut gc = Collector::new(config).unwrap();
        for step in 0..1_000 {
            match gc.cons(Value::integer(step as isize), gc.root(0)) {
                Ok(cell) => gc.set_root(0, cell),
                Err(err) => return (step, err.kind()),
            }
        }
        panic!("heap never filled");
    }

    for mode in [GcMode::Incremental, GcMode::StopTheWorld] {
        let first = fail_step(mode);
        assert_eq!(first, fail_step(mode));
        assert_eq!(first.1, ErrorKind::HeapExhausted);
    }
    // with everything live, stop-the-world fails on the cell after capacity
    assert_eq!(fail_step(GcMode::StopTheWorld).0, 12);

    // incremental mode keeps allocating at T while survivors are still being
    // evacuated to B, so the failure comes once the two meet; smaller quanta
    // evacuate more slowly and get further
    assert_eq!(fail_step(GcMode::Incremental).0, 14);
    let slow = GcConfig::default()
        .with_semispace_cells(12)
        .with_scan_quantum(1);
    assert_eq!(fail_step_with(slow.clone()), (17, ErrorKind::HeapExhausted));
    assert_eq!(fail_step_with(slow.clone()), fail_step_with(slow));
}

#[test]
fn test_mutation_survives_collection() {
    for mode in [GcMode::Incremental, GcMode::StopTheWorld] {
        let mut gc = collector(10, mode);
        let cell = gc.cons(Value::NIL, Value::NIL).unwrap();
        gc.set_root(0, cell);
        let tail = gc.cons(Value::integer(7), Value::NIL).unwrap();

        let cell = gc.root(0);
        gc.rplaca(cell, Value::integer(42)).unwrap();
        gc.rplacd(cell, tail).unwrap();

        churn_until(&mut gc, |gc| gc.stats().flips >= 3);

        let cell = gc.root(0);
        assert_eq!(gc.car(cell).unwrap(), Value::integer(42));
        let tail = gc.cdr(cell).unwrap();
        assert_eq!(gc.car(tail).unwrap(), Value::integer(7));
        assert!(gc.cdr(tail).unwrap().is_nil());
    }
}

#[test]
fn test_eq_is_identity_across_flips() {
    let mut gc = collector(8, GcMode::Incremental);
    let cell = gc.cons(Value::integer(1), Value::NIL).unwrap();
    gc.set_root(0, cell);
    gc.set_root(1, cell);
    let other = gc.cons(Value::integer(1), Value::NIL).unwrap();
    gc.set_root(2, other);

    churn_until(&mut gc, |gc| gc.stats().flips == 1);
    assert!(gc.eq(gc.root(0), gc.root(1)));
    assert!(!gc.eq(gc.root(0), gc.root(2)));
}

#[test]
fn test_zero_capacity() {
    let mut gc = collector(0, GcMode::Incremental);
    let err = gc.cons(Value::integer(1), Value::NIL).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HeapExhausted);
    assert!(gc.is_atom(Value::HeapRef(Address::new(0))));
    assert!(gc.is_atom(Value::NIL));
}

#[test]
fn test_accessor_on_atom_is_contract_violation() {
    let mut gc = collector(4, GcMode::StopTheWorld);
    for atom in [Value::integer(3), Value::NIL] {
        assert_eq!(gc.car(atom).unwrap_err().kind(), ErrorKind::TypeContractViolation);
        assert_eq!(gc.cdr(atom).unwrap_err().kind(), ErrorKind::TypeContractViolation);
        assert_eq!(
            gc.rplaca(atom, Value::NIL).unwrap_err().kind(),
            ErrorKind::TypeContractViolation
        );
    }
}
