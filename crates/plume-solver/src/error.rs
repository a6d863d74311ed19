//! Solver misuse errors.

use std::error::Error;
use std::fmt;

/// Structural problems with the inputs handed to the solver.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    /// A vector's length does not match the matrix dimension.
    DimensionMismatch {
        /// Which operand was wrong.
        operand: &'static str,
        /// The matrix dimension.
        expected: usize,
        /// The operand's length.
        found: usize,
    },
    /// A matrix row has a zero diagonal, so it cannot be preconditioned.
    ZeroDiagonal {
        /// The offending row.
        row: usize,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch {
                operand,
                expected,
                found,
            } => write!(f, "{operand} has length {found}, expected {expected}"),
            Self::ZeroDiagonal { row } => write!(f, "row {row} has a zero diagonal"),
        }
    }
}

impl Error for SolverError {}

/// Check that `found` matches the matrix dimension.
pub(crate) fn check_len(
    operand: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), SolverError> {
    if expected == found {
        Ok(())
    } else {
        Err(SolverError::DimensionMismatch {
            operand,
            expected,
            found,
        })
    }
}
