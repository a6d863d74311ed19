//! Deterministic particle seeding inside closed meshes.

use crate::particle::Particle;
use glam::DVec3;
use log::debug;
use plume_core::{CellTransform, Grid, GridError};
use plume_grid::{interior_mask, mesh_to_level_set, ScalarGrid};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Scatter `points_per_cell` jittered particles in every active cell of
/// `mask`, in the mask's iteration order.
///
/// Positions are uniform within each voxel. The same mask, count and seed
/// always produce the same particles.
pub fn scatter_in_cells(
    transform: &CellTransform,
    mask: &ScalarGrid,
    points_per_cell: usize,
    radius: f64,
    seed: u64,
) -> Vec<Particle> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut particles = Vec::with_capacity(mask.active_count() * points_per_cell);
    for c in mask.coords() {
        for _ in 0..points_per_cell {
            let jitter = DVec3::new(
                rng.random::<f64>() - 0.5,
                rng.random::<f64>() - 0.5,
                rng.random::<f64>() - 0.5,
            );
            let position = transform.index_to_world(c.as_dvec3() + jitter);
            particles.push(Particle::at_rest(position, radius));
        }
    }
    particles
}

/// Fill the interior of a closed triangle mesh with particles at rest.
///
/// # Errors
///
/// Propagates [`GridError`] from mesh conversion.
pub fn scatter_in_mesh(
    transform: &CellTransform,
    vertices: &[DVec3],
    triangles: &[[u32; 3]],
    half_width: f64,
    points_per_cell: usize,
    radius: f64,
    seed: u64,
) -> Result<Vec<Particle>, GridError> {
    let level_set = mesh_to_level_set(transform, vertices, triangles, half_width)?;
    let mask = interior_mask(&level_set);
    let particles = scatter_in_cells(transform, &mask, points_per_cell, radius, seed);
    debug!(
        "scattered {} particles over {} interior cells",
        particles.len(),
        mask.active_count()
    );
    Ok(particles)
}
