//! External body forces.

use glam::DVec3;
use plume_core::Grid;
use plume_grid::{ScalarGrid, VectorGrid};

/// Uniform acceleration over the active density topology.
pub fn gravity_field(density: &ScalarGrid, gravity: DVec3) -> VectorGrid {
    let mut forces = VectorGrid::with_capacity(density.active_count());
    forces.topology_union(density);
    forces.transform_values(|f| f + gravity);
    forces
}

/// Integrate `forces` over `dt` into `velocity`, activating any force
/// cell not yet present in the velocity field.
pub fn apply_forces(velocity: &mut VectorGrid, forces: &VectorGrid, dt: f64) {
    velocity.combine(forces, |v, f| v + f * dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_core::Coord;

    #[test]
    fn gravity_covers_density_and_scales_by_dt() {
        let mut density = ScalarGrid::new();
        density.set(Coord::new(0, 0, 0), 1.0);
        density.set(Coord::new(0, 0, 1), 0.5);
        let forces = gravity_field(&density, DVec3::new(0.0, 0.0, -10.0));
        assert_eq!(forces.active_count(), 2);

        let mut velocity = VectorGrid::new();
        velocity.set(Coord::new(0, 0, 0), DVec3::X);
        velocity.set(Coord::new(4, 0, 0), DVec3::Y);
        apply_forces(&mut velocity, &forces, 0.1);
        assert_eq!(
            velocity.get(Coord::new(0, 0, 0)),
            DVec3::new(1.0, 0.0, -1.0)
        );
        assert_eq!(
            velocity.get(Coord::new(0, 0, 1)),
            DVec3::new(0.0, 0.0, -1.0)
        );
        assert_eq!(velocity.get(Coord::new(4, 0, 0)), DVec3::Y);
    }
}
