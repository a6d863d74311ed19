//! Semi-Lagrangian self-advection of the staggered velocity field.

use glam::DVec3;
use plume_core::{Axis, CellTransform, Grid};
use plume_grid::{sample_staggered_component, VectorGrid};

/// Advect `velocity` through itself over `dt`.
///
/// Each active sample traces back from its cell center along its own
/// stored vector and reads every component from the previous field at the
/// departure point. The new field has the same topology and replaces the
/// old one wholesale, so no sample ever reads a value written in the same
/// pass.
pub fn advect_velocity(transform: &CellTransform, velocity: &mut VectorGrid, dt: f64) {
    let previous = std::mem::take(velocity);
    let mut next = VectorGrid::with_capacity(previous.active_count());
    for (c, v0) in previous.iter() {
        let departure = transform.world_to_index(transform.cell_center(c) - dt * v0);
        let mut v = DVec3::ZERO;
        for axis in Axis::ALL {
            v[axis.index()] = sample_staggered_component(
                &previous,
                departure - 0.5 * axis.unit_vec(),
                axis,
            );
        }
        next.set(c, v);
    }
    *velocity = next;
}
