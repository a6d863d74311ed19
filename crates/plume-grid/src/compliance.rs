//! Grid trait compliance test helpers.
//!
//! These functions verify that a [`Grid`] implementation satisfies the
//! invariants of the trait contract. Reused by every value type stored in
//! [`SparseGrid`].

use crate::sparse::SparseGrid;
use indexmap::IndexSet;
use plume_core::{Coord, Grid, GridValue};

fn sample_coords() -> Vec<Coord> {
    vec![
        Coord::new(0, 0, 0),
        Coord::new(-3, 7, 2),
        Coord::new(100, -100, 5),
        Coord::new(1, 0, 0),
        Coord::new(0, 1, 0),
    ]
}

/// Assert that inactive cells read as the background and probe as `None`.
pub fn assert_inactive_reads_background<T: GridValue>(grid: &dyn Grid<T>) {
    let c = Coord::new(i32::MAX, i32::MIN, 0);
    assert!(!grid.is_active(c));
    assert_eq!(grid.probe(c), None);
    assert_eq!(grid.get(c), T::default());
}

/// Assert that `set` activates cells, including for the background value.
pub fn assert_set_activates<T: GridValue>(grid: &mut dyn Grid<T>, value: T) {
    let c = Coord::new(9, 9, 9);
    grid.set(c, T::default());
    assert!(grid.is_active(c), "set with background value must activate");
    grid.set(c, value);
    assert_eq!(grid.probe(c), Some(value));
    assert_eq!(grid.deactivate(c), Some(value));
    assert!(!grid.is_active(c));
    assert_eq!(grid.deactivate(c), None);
}

/// Assert that iteration yields each active cell exactly once, and that
/// two grids built by the same sequence of mutations iterate identically.
pub fn assert_iteration_stable<T: GridValue>(make_value: impl Fn(usize) -> T) {
    let build = || {
        let mut g = SparseGrid::<T>::new();
        for (i, c) in sample_coords().into_iter().enumerate() {
            g.set(c, make_value(i));
        }
        g.deactivate(Coord::new(-3, 7, 2));
        g.set(Coord::new(0, 0, 0), make_value(42));
        g
    };
    let a = build();
    let b = build();
    let seq_a: Vec<_> = a.active_cells().collect();
    let seq_b: Vec<_> = b.active_cells().collect();
    assert_eq!(
        seq_a,
        seq_b,
        "iteration order depends on more than mutation history"
    );

    let unique: IndexSet<Coord> = seq_a.iter().map(|(c, _)| *c).collect();
    assert_eq!(unique.len(), seq_a.len(), "iteration yielded a cell twice");
    assert_eq!(seq_a.len(), a.active_count());
}

/// Assert that `clear` deactivates every cell.
pub fn assert_clear_empties<T: GridValue>(grid: &mut dyn Grid<T>, value: T) {
    for c in sample_coords() {
        grid.set(c, value);
    }
    assert!(!grid.is_empty());
    grid.clear();
    assert!(grid.is_empty());
    assert_eq!(grid.active_cells().count(), 0);
}

/// Run all compliance checks against fresh [`SparseGrid`]s.
pub fn run_full_compliance<T: GridValue>(make_value: impl Fn(usize) -> T) {
    let mut g = SparseGrid::<T>::new();
    assert_inactive_reads_background(&g);
    assert_set_activates(&mut g, make_value(1));
    assert_clear_empties(&mut g, make_value(2));
    assert_iteration_stable(make_value);
}
