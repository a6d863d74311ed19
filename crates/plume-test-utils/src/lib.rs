//! Test utilities and fixtures for Plume development.
//!
//! Provides closed mesh builders for obstacle and seeding tests, particle
//! position layouts, a divergence probe for projection assertions, and a
//! one-call logger setup.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{box_mesh, grid_positions, slab_mesh, Mesh};

use glam::DVec3;
use plume_core::{Axis, Grid};
use plume_grid::{ScalarGrid, VectorGrid};

/// Route `log` output through `env_logger` for the current test binary.
///
/// Safe to call from every test; only the first call installs the logger.
/// Set `RUST_LOG=debug` to see per-step summaries.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Largest absolute staggered divergence over the active cells of `domain`.
pub fn max_divergence(velocity: &VectorGrid, domain: &ScalarGrid, voxel_size: f64) -> f64 {
    domain
        .coords()
        .map(|c| {
            let v: DVec3 = velocity.get(c);
            let flux: f64 = Axis::ALL
                .iter()
                .map(|&a| velocity.get(c.step_up(a))[a.index()] - v[a.index()])
                .sum();
            (flux / voxel_size).abs()
        })
        .fold(0.0, f64::max)
}
