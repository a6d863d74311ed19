//! Sparse voxel grids for Plume simulations.
//!
//! This crate provides the storage every simulation stage works on:
//!
//! - [`SparseGrid`]: an insertion-ordered sparse map implementing
//!   [`Grid`](plume_core::Grid), plus topology algebra (union,
//!   intersection, difference), max-combine, pairwise combine, per-value
//!   transforms and pruning.
//! - [`sampler`]: trilinear stencils and the staggered-aware sampler used
//!   for particle transfer and advection.
//! - [`level_set`]: closed triangle mesh to narrow-band signed distance
//!   field, and interior-mask extraction.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod level_set;
pub mod sampler;
pub mod sparse;
mod topology;

#[cfg(test)]
pub(crate) mod compliance;

pub use level_set::{interior_mask, mesh_to_level_set, LEVEL_SET_HALF_WIDTH};
pub use sampler::{sample_staggered, sample_staggered_component, sample_trilinear, TrilinearStencil};
pub use sparse::SparseGrid;

/// Sparse scalar field (density, pressure, divergence, obstacles).
pub type ScalarGrid = SparseGrid<f64>;

/// Sparse vector field; velocity fields use the staggered convention.
pub type VectorGrid = SparseGrid<glam::DVec3>;
