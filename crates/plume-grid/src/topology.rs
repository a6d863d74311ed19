//! Topology algebra and value combination for [`SparseGrid`].
//!
//! Topology operations only look at which cells are active in the other
//! grid, so a scalar obstacle mask can carve a vector velocity field.

use crate::sparse::SparseGrid;
use plume_core::{Grid, GridValue};

impl<T: GridValue> SparseGrid<T> {
    /// Activate every cell active in `other`; newly activated cells take
    /// the background value. Existing values are untouched.
    pub fn topology_union<U: GridValue, G: Grid<U> + ?Sized>(&mut self, other: &G) {
        for (c, _) in other.active_cells() {
            self.modify(c, |_| {});
        }
    }

    /// Keep only cells that are also active in `other`.
    pub fn topology_intersection<U: GridValue, G: Grid<U> + ?Sized>(&mut self, other: &G) {
        self.retain(|c, _| other.is_active(c));
    }

    /// Deactivate every cell that is active in `other`.
    pub fn topology_difference<U: GridValue, G: Grid<U> + ?Sized>(&mut self, other: &G) {
        self.retain(|c, _| !other.is_active(c));
    }

    /// Merge `other` into `self`, keeping the componentwise maximum where
    /// both are active and copying `other`'s value where only it is.
    pub fn max_combine<G: Grid<T> + ?Sized>(&mut self, other: &G) {
        for (c, v) in other.active_cells() {
            match self.probe(c) {
                Some(existing) => self.set(c, existing.max_value(v)),
                None => self.set(c, v),
            }
        }
    }

    /// Combine pairwise with `other` over the union of both topologies.
    ///
    /// Every cell active in either grid ends up active with
    /// `f(self_value, other_value)`, inactive sides reading as background.
    pub fn combine<G: Grid<T> + ?Sized>(&mut self, other: &G, mut f: impl FnMut(T, T) -> T) {
        for (c, v) in self.iter_mut() {
            *v = f(*v, other.get(c));
        }
        for (c, b) in other.active_cells() {
            if !self.is_active(c) {
                self.set(c, f(T::default(), b));
            }
        }
    }

    /// Replace every active value with `f(value)`.
    pub fn transform_values(&mut self, mut f: impl FnMut(T) -> T) {
        for (_, v) in self.iter_mut() {
            *v = f(*v);
        }
    }
}
