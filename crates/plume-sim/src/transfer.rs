//! Particle to grid rasterization and grid to particle integration.

use crate::particle::Particle;
use glam::DVec3;
use plume_core::{Axis, CellTransform, Grid};
use plume_grid::{sample_staggered, ScalarGrid, TrilinearStencil, VectorGrid};

/// Rebuild `density` and `velocity` from the particle cloud.
///
/// Both fields are cleared first. Every particle spreads one unit of
/// density over the 8 cell centers around it with trilinear weights, and
/// all 8 cells become active even when a weight is zero. Velocity is
/// splatted per axis onto that axis's own face lattice, accumulating
/// momentum and weight separately; each face then holds the weighted mean
/// of the particle velocities that reached it, or zero where no weight
/// landed.
pub fn rasterize_to_grid(
    transform: &CellTransform,
    particles: &[Particle],
    density: &mut ScalarGrid,
    velocity: &mut VectorGrid,
) {
    density.clear();
    velocity.clear();
    let mut weights = VectorGrid::new();

    for particle in particles {
        let q = transform.world_to_index(particle.position);
        for (c, w) in TrilinearStencil::at(q).corners() {
            density.accumulate(c, w);
        }
        for axis in Axis::ALL {
            let i = axis.index();
            let momentum = particle.velocity[i];
            for (c, w) in TrilinearStencil::at(q + 0.5 * axis.unit_vec()).corners() {
                velocity.modify(c, |m| m[i] += w * momentum);
                weights.modify(c, |m| m[i] += w);
            }
        }
    }

    for (c, m) in velocity.iter_mut() {
        let w = weights.get(c);
        for i in 0..3 {
            m[i] = if w[i] > 0.0 { m[i] / w[i] } else { 0.0 };
        }
    }
}

/// Sample the staggered velocity field at a world position.
pub fn sample_velocity(transform: &CellTransform, velocity: &VectorGrid, position: DVec3) -> DVec3 {
    sample_staggered(velocity, transform.world_to_index(position))
}

/// Advance every particle through `velocity` with a midpoint (RK2) step.
///
/// The particle's stored velocity is replaced by the field sample at its
/// new position.
pub fn update_particles(
    transform: &CellTransform,
    particles: &mut [Particle],
    velocity: &VectorGrid,
    dt: f64,
) {
    for particle in particles {
        let x = particle.position;
        let v1 = sample_velocity(transform, velocity, x);
        let midpoint = x + 0.5 * dt * v1;
        let v2 = sample_velocity(transform, velocity, midpoint);
        let next = x + dt * v2;
        particle.position = next;
        particle.velocity = sample_velocity(transform, velocity, next);
    }
}
