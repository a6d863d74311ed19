//! Plume: sparse-grid smoke simulation driven by a particle cloud.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Plume sub-crates. For most users, adding `plume` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use plume::prelude::*;
//! use plume::glam::DVec3;
//!
//! let config = SimConfig::with_voxel_size(0.25, DVec3::ZERO).unwrap();
//! let mut sim = Simulator::new(config).unwrap();
//!
//! // A solid floor below the origin.
//! let floor = [
//!     DVec3::new(-2.0, -2.0, -1.0), DVec3::new(2.0, -2.0, -1.0),
//!     DVec3::new(2.0, 2.0, -1.0), DVec3::new(-2.0, 2.0, -1.0),
//!     DVec3::new(-2.0, -2.0, -0.2), DVec3::new(2.0, -2.0, -0.2),
//!     DVec3::new(2.0, 2.0, -0.2), DVec3::new(-2.0, 2.0, -0.2),
//! ];
//! let triangles = [
//!     [0, 2, 1], [0, 3, 2], [4, 5, 6], [4, 6, 7], [0, 1, 5], [0, 5, 4],
//!     [3, 7, 6], [3, 6, 2], [0, 4, 7], [0, 7, 3], [1, 2, 6], [1, 6, 5],
//! ];
//! sim.add_obstacle(&floor, &triangles).unwrap();
//!
//! sim.seed_particles((0..10).map(|i| {
//!     Particle::at_rest(DVec3::new(0.0, 0.0, 0.1 * i as f64), 0.1)
//! }));
//! assert!(sim.step(1.0 / 30.0));
//! assert_eq!(sim.current_step(), StepId(1));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `plume-core` | Coordinates, transform, grid traits, IDs, errors |
//! | [`grid`] | `plume-grid` | Sparse grids, samplers, mesh level sets |
//! | [`solver`] | `plume-solver` | Sparse matrix, Jacobi preconditioner, PCG |
//! | [`sim`] | `plume-sim` | Transfer, obstacles, forces, advection, projection |
//! | [`engine`] | `plume-engine` | Configuration, metrics, the `Simulator` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Vector math (`glam`), re-exported so callers share the same `DVec3`.
pub use glam;

/// Core types, traits, and IDs (`plume-core`).
pub use plume_core as types;

/// Sparse voxel storage, samplers, and level sets (`plume-grid`).
pub use plume_grid as grid;

/// Sparse linear algebra (`plume-solver`).
pub use plume_solver as solver;

/// Simulation stages (`plume-sim`).
///
/// Use these directly to build a custom pipeline; [`engine::Simulator`]
/// runs the standard one.
pub use plume_sim as sim;

/// Simulator orchestration (`plume-engine`).
pub use plume_engine as engine;

/// Common imports for typical Plume usage.
///
/// ```rust
/// use plume::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use plume_core::{Axis, CellTransform, Coord, Grid, GridValue, StepId};

    // Errors
    pub use plume_core::{GridError, StepError};
    pub use plume_engine::ConfigError;

    // Grids
    pub use plume_grid::{ScalarGrid, SparseGrid, VectorGrid};

    // Solver results
    pub use plume_solver::SolverState;

    // Simulation
    pub use plume_sim::{ObstacleMask, Particle};

    // Engine
    pub use plume_engine::{SimConfig, Simulator, SolverSettings, StepMetrics, StepReport};
}
