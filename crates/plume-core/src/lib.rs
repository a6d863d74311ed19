//! Core types and traits for the Plume smoke simulation core.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! vocabulary shared by every other crate in the workspace: integer cell
//! coordinates, the world/index transform, the sparse-grid capability
//! traits, step identifiers and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coord;
pub mod error;
pub mod id;
pub mod traits;
pub mod transform;

pub use coord::{Axis, Coord, NEIGHBOUR_OFFSETS};
pub use error::{GridError, StepError};
pub use id::StepId;
pub use traits::{Grid, GridValue};
pub use transform::CellTransform;
