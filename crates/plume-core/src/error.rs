//! Error types for the Plume simulation core.
//!
//! Organized by subsystem: grid/geometry construction and simulation
//! stepping. Solver non-convergence is deliberately absent: it is an
//! outcome reported in the solver state, not an error.

use std::error::Error;
use std::fmt;

/// Errors arising from grid, transform, or mesh ingestion.
#[derive(Clone, Debug, PartialEq)]
pub enum GridError {
    /// Voxel size is NaN, infinite, zero, or negative.
    InvalidVoxelSize {
        /// The offending value.
        value: f64,
    },
    /// Narrow-band half-width is NaN, infinite, zero, or negative.
    InvalidHalfWidth {
        /// The offending value, in voxels.
        value: f64,
    },
    /// A triangle references a vertex that does not exist.
    MeshIndexOutOfRange {
        /// Index of the offending triangle.
        triangle: usize,
        /// The out-of-range vertex index.
        vertex: u32,
        /// Number of vertices supplied.
        vertex_count: usize,
    },
    /// A vertex has a non-finite coordinate.
    NonFiniteVertex {
        /// Index of the offending vertex.
        index: usize,
    },
    /// A transform origin has a non-finite coordinate.
    NonFiniteOrigin,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidVoxelSize { value } => {
                write!(f, "voxel size must be finite and positive, got {value}")
            }
            Self::InvalidHalfWidth { value } => {
                write!(
                    f,
                    "narrow-band half-width must be finite and positive, got {value}"
                )
            }
            Self::MeshIndexOutOfRange {
                triangle,
                vertex,
                vertex_count,
            } => write!(
                f,
                "triangle {triangle} references vertex {vertex}, but only {vertex_count} vertices exist"
            ),
            Self::NonFiniteVertex { index } => {
                write!(f, "vertex {index} has a non-finite coordinate")
            }
            Self::NonFiniteOrigin => write!(f, "transform origin has a non-finite coordinate"),
        }
    }
}

impl Error for GridError {}

/// Errors from `Simulator::try_step` (in `plume-engine`).
///
/// A failed pressure solve is not a `StepError`: the step completes
/// without correction and the failure is reported in the step report.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// The requested dt is NaN, infinite, zero, or negative.
    InvalidDt {
        /// The rejected value.
        value: f64,
    },
    /// The linear system handed to the solver was structurally invalid.
    SolverMisuse {
        /// Description from the solver.
        reason: String,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDt { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::SolverMisuse { reason } => write!(f, "solver misuse: {reason}"),
        }
    }
}

impl Error for StepError {}
