//! Simulation stages for Plume smoke simulations.
//!
//! Each stage is a plain function (or a small stateful struct) over the
//! sparse grids from `plume-grid`:
//!
//! - [`transfer`]: particles to density/velocity and RK2 particle integration.
//! - [`obstacle`]: persistent solid cells and no-penetration enforcement.
//! - [`forces`]: body forces over the density topology.
//! - [`advect`]: semi-Lagrangian velocity self-advection.
//! - [`pressure`]: divergence removal via a sparse Poisson solve.
//! - [`scatter`]: deterministic particle seeding inside meshes.
//!
//! The fixed ordering of the stages lives in `plume-engine`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod advect;
pub mod forces;
pub mod obstacle;
pub mod particle;
pub mod pressure;
pub mod scatter;
pub mod transfer;

pub use advect::advect_velocity;
pub use forces::{apply_forces, gravity_field};
pub use obstacle::ObstacleMask;
pub use particle::Particle;
pub use pressure::{NeighbourKind, PressureProjector, Projection, ProjectionSettings};
pub use scatter::{scatter_in_cells, scatter_in_mesh};
pub use transfer::{rasterize_to_grid, sample_velocity, update_particles};
