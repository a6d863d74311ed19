//! Trilinear stencils and the staggered-aware sampler.
//!
//! All positions here are fractional index-space coordinates. A plain
//! trilinear sample interpolates the values stored at integer lattice
//! points. The staggered sampler accounts for velocity component `a`
//! living at `c - 0.5 e_a`: to read component `a` at physical position
//! `p`, the stored lattice is interpolated at `p + 0.5 e_a`.

use glam::DVec3;
use plume_core::{Axis, Coord, Grid, GridValue};

/// The 8 lattice points surrounding a fractional position, with
/// trilinear hat-function weights that sum to one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrilinearStencil {
    base: Coord,
    frac: DVec3,
}

impl TrilinearStencil {
    /// Stencil for the index-space position `p`.
    pub fn at(p: DVec3) -> Self {
        let floor = p.floor();
        Self {
            base: Coord::floor(p),
            frac: p - floor,
        }
    }

    /// Lower corner of the stencil.
    pub fn base(&self) -> Coord {
        self.base
    }

    /// Fractional offset of the position from [`base`](Self::base), in `[0, 1)`.
    pub fn frac(&self) -> DVec3 {
        self.frac
    }

    /// The 8 corners with their weights, x varying fastest.
    pub fn corners(&self) -> impl Iterator<Item = (Coord, f64)> {
        let base = self.base;
        let f = self.frac;
        (0..8).map(move |i| {
            let (dx, dy, dz) = (i & 1, (i >> 1) & 1, (i >> 2) & 1);
            let wx = if dx == 1 { f.x } else { 1.0 - f.x };
            let wy = if dy == 1 { f.y } else { 1.0 - f.y };
            let wz = if dz == 1 { f.z } else { 1.0 - f.z };
            (base + Coord::new(dx, dy, dz), wx * wy * wz)
        })
    }
}

/// Trilinearly interpolate the stored lattice at index-space position `p`.
pub fn sample_trilinear<T, G>(grid: &G, p: DVec3) -> T
where
    T: GridValue,
    G: Grid<T> + ?Sized,
{
    TrilinearStencil::at(p)
        .corners()
        .fold(T::default(), |acc, (c, w)| acc + grid.get(c) * w)
}

/// Sample one staggered velocity component at physical index position `p`.
pub fn sample_staggered_component<G>(grid: &G, p: DVec3, axis: Axis) -> f64
where
    G: Grid<DVec3> + ?Sized,
{
    sample_trilinear::<DVec3, G>(grid, p + 0.5 * axis.unit_vec())[axis.index()]
}

/// Sample a staggered velocity field at physical index position `p`,
/// each component on its own face lattice.
pub fn sample_staggered<G>(grid: &G, p: DVec3) -> DVec3
where
    G: Grid<DVec3> + ?Sized,
{
    DVec3::new(
        sample_staggered_component(grid, p, Axis::X),
        sample_staggered_component(grid, p, Axis::Y),
        sample_staggered_component(grid, p, Axis::Z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::SparseGrid;
    use proptest::prelude::*;

    #[test]
    fn lattice_point_reproduces_stored_value() {
        let mut g = SparseGrid::<f64>::new();
        g.set(Coord::new(2, 3, 4), 7.0);
        assert_eq!(sample_trilinear(&g, DVec3::new(2.0, 3.0, 4.0)), 7.0);
    }

    #[test]
    fn midpoint_averages_neighbours() {
        let mut g = SparseGrid::<f64>::new();
        g.set(Coord::new(0, 0, 0), 2.0);
        g.set(Coord::new(1, 0, 0), 4.0);
        let mid: f64 = sample_trilinear(&g, DVec3::new(0.5, 0.0, 0.0));
        assert!((mid - 3.0).abs() < 1e-12);
    }

    #[test]
    fn staggered_component_reads_its_own_face() {
        // u stored at (1,0,0) lives at x = 0.5.
        let mut g = SparseGrid::<DVec3>::new();
        g.set(Coord::new(1, 0, 0), DVec3::new(3.0, 0.0, 0.0));
        let u = sample_staggered_component(&g, DVec3::new(0.5, 0.0, 0.0), Axis::X);
        assert!((u - 3.0).abs() < 1e-12);
        // The same stored vector's y component lives at (1, -0.5, 0).
        g.set(Coord::new(1, 0, 0), DVec3::new(0.0, 5.0, 0.0));
        let v = sample_staggered_component(&g, DVec3::new(1.0, -0.5, 0.0), Axis::Y);
        assert!((v - 5.0).abs() < 1e-12);
    }

    #[test]
    fn uniform_field_samples_uniformly() {
        let mut g = SparseGrid::<DVec3>::new();
        for x in -2..4 {
            for y in -2..4 {
                for z in -2..4 {
                    g.set(Coord::new(x, y, z), DVec3::new(1.0, 2.0, 3.0));
                }
            }
        }
        let v = sample_staggered(&g, DVec3::new(0.3, 1.7, 0.2));
        assert!((v - DVec3::new(1.0, 2.0, 3.0)).length() < 1e-12);
    }

    #[test]
    fn far_stencil_stays_on_the_lattice() {
        let s = TrilinearStencil::at(DVec3::new(3.0e9, -3.0e9, 0.5));
        assert_eq!(s.base(), Coord::new(Coord::LIMIT, -Coord::LIMIT, 0));
        let top = s.corners().map(|(c, _)| c.x).max();
        assert_eq!(top, Some(Coord::LIMIT + 1));
    }

    proptest! {
        #[test]
        fn weights_sum_to_one(x in -50.0f64..50.0, y in -50.0f64..50.0, z in -50.0f64..50.0) {
            let s = TrilinearStencil::at(DVec3::new(x, y, z));
            let total: f64 = s.corners().map(|(_, w)| w).sum();
            prop_assert!((total - 1.0).abs() < 1e-12);
            prop_assert!(s.corners().all(|(_, w)| w >= 0.0));
        }
    }
}
