//! Insertion-ordered sparse voxel storage.

use indexmap::IndexMap;
use plume_core::{Coord, Grid, GridValue};

/// Sparse grid backed by an insertion-ordered hash map.
///
/// Only active cells are stored. Iteration follows insertion order, and
/// every bulk operation that removes cells preserves the relative order of
/// the survivors, so two grids built by the same sequence of operations
/// iterate identically. That is what makes simulation steps bitwise
/// reproducible.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseGrid<T> {
    cells: IndexMap<Coord, T>,
}

impl<T: GridValue> SparseGrid<T> {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self {
            cells: IndexMap::new(),
        }
    }

    /// Create an empty grid with room for `capacity` active cells.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: IndexMap::with_capacity(capacity),
        }
    }

    /// Iterate over `(coord, value)` pairs in stable order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, T)> + '_ {
        self.cells.iter().map(|(&c, &v)| (c, v))
    }

    /// Iterate over active coordinates in stable order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.keys().copied()
    }

    /// Iterate mutably over active values in stable order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Coord, &mut T)> + '_ {
        self.cells.iter_mut().map(|(&c, v)| (c, v))
    }

    /// Dense position of an active cell in the iteration order.
    pub fn position(&self, coord: Coord) -> Option<usize> {
        self.cells.get_index_of(&coord)
    }

    /// Add `value` to a cell, activating it with the background first if
    /// it was inactive.
    pub fn accumulate(&mut self, coord: Coord, value: T) {
        let slot = self.cells.entry(coord).or_default();
        *slot = *slot + value;
    }

    /// Apply `f` to the cell's value, activating it with the background
    /// first if it was inactive.
    pub fn modify(&mut self, coord: Coord, f: impl FnOnce(&mut T)) {
        f(self.cells.entry(coord).or_default());
    }

    /// Keep only active cells for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(Coord, &T) -> bool) {
        self.cells.retain(|c, v| keep(*c, v));
    }

    /// Deactivate every cell whose magnitude is below `tolerance`.
    ///
    /// A tolerance of zero removes nothing.
    pub fn prune(&mut self, tolerance: f64) {
        self.cells.retain(|_, v| v.magnitude() >= tolerance);
    }

    /// Release storage held by previously removed cells.
    pub fn compact(&mut self) {
        self.cells.shrink_to_fit();
    }

    /// Largest magnitude over active cells, or zero when empty.
    pub fn max_magnitude(&self) -> f64 {
        self.cells
            .values()
            .map(|v| v.magnitude())
            .fold(0.0, f64::max)
    }
}

impl<T: GridValue> Default for SparseGrid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GridValue> Grid<T> for SparseGrid<T> {
    fn probe(&self, coord: Coord) -> Option<T> {
        self.cells.get(&coord).copied()
    }

    fn set(&mut self, coord: Coord, value: T) {
        self.cells.insert(coord, value);
    }

    fn deactivate(&mut self, coord: Coord) -> Option<T> {
        self.cells.shift_remove(&coord)
    }

    fn active_count(&self) -> usize {
        self.cells.len()
    }

    fn active_cells(&self) -> Box<dyn Iterator<Item = (Coord, T)> + '_> {
        Box::new(self.iter())
    }

    fn clear(&mut self) {
        self.cells.clear();
    }
}

impl<T: GridValue> FromIterator<(Coord, T)> for SparseGrid<T> {
    fn from_iter<I: IntoIterator<Item = (Coord, T)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance;
    use glam::DVec3;

    #[test]
    fn scalar_grid_compliance() {
        compliance::run_full_compliance::<f64>(|i| i as f64 + 0.5);
    }

    #[test]
    fn vector_grid_compliance() {
        compliance::run_full_compliance::<DVec3>(|i| DVec3::new(i as f64, -1.0, 2.0));
    }

    #[test]
    fn accumulate_activates_and_sums() {
        let mut g = SparseGrid::<f64>::new();
        let c = Coord::new(1, 1, 1);
        g.accumulate(c, 0.25);
        g.accumulate(c, 0.5);
        assert_eq!(g.probe(c), Some(0.75));
        assert_eq!(g.active_count(), 1);
    }

    #[test]
    fn prune_keeps_order_of_survivors() {
        let mut g: SparseGrid<f64> = [
            (Coord::new(3, 0, 0), 1.0),
            (Coord::new(1, 0, 0), 1e-6),
            (Coord::new(2, 0, 0), -2.0),
            (Coord::new(0, 0, 0), 0.0),
        ]
        .into_iter()
        .collect();
        g.prune(1e-4);
        let coords: Vec<_> = g.coords().collect();
        assert_eq!(coords, vec![Coord::new(3, 0, 0), Coord::new(2, 0, 0)]);
    }

    #[test]
    fn prune_with_zero_tolerance_keeps_zero_cells() {
        let mut g = SparseGrid::<f64>::new();
        g.set(Coord::new(0, 0, 0), 0.0);
        g.prune(0.0);
        assert!(g.is_active(Coord::new(0, 0, 0)));
    }

    #[test]
    fn max_magnitude_of_vectors() {
        let mut g = SparseGrid::<DVec3>::new();
        assert_eq!(g.max_magnitude(), 0.0);
        g.set(Coord::new(0, 0, 0), DVec3::new(0.0, 3.0, 4.0));
        g.set(Coord::new(1, 0, 0), DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(g.max_magnitude(), 5.0);
    }

    #[test]
    fn position_tracks_iteration_order() {
        let mut g = SparseGrid::<f64>::new();
        g.set(Coord::new(5, 5, 5), 1.0);
        g.set(Coord::new(-1, 0, 0), 2.0);
        assert_eq!(g.position(Coord::new(5, 5, 5)), Some(0));
        assert_eq!(g.position(Coord::new(-1, 0, 0)), Some(1));
        assert_eq!(g.position(Coord::new(0, 0, 0)), None);
    }
}
