//! Benchmark scenes for the Plume smoke simulation core.
//!
//! - [`reference_scene`]: a smoke column over a solid floor, about 2.4K
//!   particles on a 0.1 voxel grid.
//! - [`stress_scene`]: the same layout at half the particle spacing, about 18K.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use glam::DVec3;
use plume_core::CellTransform;
use plume_engine::{SimConfig, Simulator};
use plume_sim::Particle;
use plume_test_utils::{grid_positions, slab_mesh};

/// Voxel edge length of the benchmark scenes.
pub const VOXEL_SIZE: f64 = 0.1;

/// Build a simulator with a floor slab and a column of smoke with
/// `spacing` between particles.
///
/// # Panics
///
/// Panics if the fixed scene geometry is rejected, which would indicate a
/// bug in the grid crates.
pub fn column_scene(spacing: f64) -> Simulator {
    let config = SimConfig {
        transform: CellTransform::uniform(VOXEL_SIZE).expect("voxel size is positive"),
        ..SimConfig::default()
    };
    let mut sim = Simulator::new(config).expect("default config is valid");
    let (v, t) = slab_mesh(2.0, -0.05, 0.3);
    sim.add_obstacle(&v, &t).expect("slab mesh is well-formed");
    let column = grid_positions(
        DVec3::new(-0.4, -0.4, 0.02),
        DVec3::new(0.4, 0.4, 1.2),
        spacing,
    );
    let radius = 0.5 * spacing;
    sim.seed_particles(column.into_iter().map(|p| Particle::at_rest(p, radius)));
    sim
}

/// Reference scene: 12 x 12 x 17 particles.
pub fn reference_scene() -> Simulator {
    column_scene(0.07)
}

/// Stress scene: 23 x 23 x 34 particles.
pub fn stress_scene() -> Simulator {
    column_scene(0.035)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_scene_steps() {
        let mut sim = reference_scene();
        assert_eq!(sim.particles().len(), 12 * 12 * 17);
        assert!(sim.obstacles().cell_count() > 0);
        sim.step(1.0 / 60.0);
        assert_eq!(sim.current_step(), plume_core::StepId(1));
        assert!(sim.last_metrics().solver_iterations > 0);
    }
}
