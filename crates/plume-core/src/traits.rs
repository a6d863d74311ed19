//! The sparse-grid capability set.
//!
//! [`Grid`] is the minimal contract the simulation stages need from a
//! sparse voxel structure: get/set with an explicit active flag, stable
//! iteration over active cells, and deactivation. Topology algebra and
//! samplers are layered on top of it in `plume-grid`.

use crate::coord::Coord;
use glam::DVec3;
use std::fmt::Debug;
use std::ops::{Add, Mul};

/// A value type storable in a sparse grid.
///
/// The `Default` value is the grid background: inactive cells read as it.
pub trait GridValue:
    Copy
    + Default
    + PartialEq
    + Debug
    + Send
    + Sync
    + Add<Output = Self>
    + Mul<f64, Output = Self>
    + 'static
{
    /// Magnitude used for pruning and error norms (absolute value or length).
    fn magnitude(&self) -> f64;

    /// Componentwise maximum of two values.
    fn max_value(self, other: Self) -> Self;
}

impl GridValue for f64 {
    fn magnitude(&self) -> f64 {
        self.abs()
    }

    fn max_value(self, other: Self) -> Self {
        self.max(other)
    }
}

impl GridValue for DVec3 {
    fn magnitude(&self) -> f64 {
        self.length()
    }

    fn max_value(self, other: Self) -> Self {
        self.max(other)
    }
}

/// Sparse mapping from [`Coord`] to `T` with an explicit active flag.
///
/// # Contract
///
/// - A cell is active iff it has a stored value; inactive cells read as
///   `T::default()` through [`get`](Grid::get).
/// - [`set`](Grid::set) always activates the cell, even for a zero value.
/// - [`active_cells`](Grid::active_cells) yields every active cell exactly
///   once, in an order that depends only on the sequence of mutations
///   applied to the grid (never on addresses or hashing seeds).
///
/// # Object Safety
///
/// The trait is object-safe so topology masks can be passed as
/// `&dyn Grid<U>` regardless of their storage backend.
pub trait Grid<T: GridValue> {
    /// Stored value of an active cell, or `None` if inactive.
    fn probe(&self, coord: Coord) -> Option<T>;

    /// Value of a cell; inactive cells read as the background.
    fn get(&self, coord: Coord) -> T {
        self.probe(coord).unwrap_or_default()
    }

    /// Store `value` at `coord` and mark the cell active.
    fn set(&mut self, coord: Coord, value: T);

    /// Mark a cell inactive, returning its previous value if it was active.
    fn deactivate(&mut self, coord: Coord) -> Option<T>;

    /// Whether a cell is active.
    fn is_active(&self, coord: Coord) -> bool {
        self.probe(coord).is_some()
    }

    /// Number of active cells.
    fn active_count(&self) -> usize;

    /// Whether no cell is active.
    fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Iterate over active cells in the grid's stable order.
    fn active_cells(&self) -> Box<dyn Iterator<Item = (Coord, T)> + '_>;

    /// Deactivate every cell.
    fn clear(&mut self);
}
