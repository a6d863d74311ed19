//! Sparse linear algebra for the Plume pressure projection.
//!
//! A deliberately small kit: a row-insertable sparse matrix whose rows are
//! built incrementally by the projector, dense vector kernels, a Jacobi
//! (inverse-diagonal) preconditioner and a preconditioned conjugate-gradient
//! solver with cooperative interruption.
//!
//! Non-convergence is an outcome, not an error: [`solve`] reports it in
//! [`SolverState`]. [`SolverError`] is reserved for structural misuse such
//! as mismatched vector lengths.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod matrix;
pub mod pcg;
pub mod preconditioner;
pub mod vector;

pub use error::SolverError;
pub use matrix::SparseMatrix;
pub use pcg::{solve, Interrupter, NullInterrupter, SolverState, TerminationCriteria};
pub use preconditioner::{JacobiPreconditioner, Preconditioner};
