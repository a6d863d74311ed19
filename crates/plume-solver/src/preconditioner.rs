//! Preconditioners for the conjugate-gradient solver.

use crate::error::SolverError;
use crate::matrix::SparseMatrix;

/// Approximate inverse of the system matrix, applied once per iteration.
pub trait Preconditioner {
    /// Compute `z = M^-1 r`. Slices have the matrix dimension.
    fn apply(&self, r: &[f64], z: &mut [f64]);
}

/// Inverse-diagonal (Jacobi) preconditioner.
#[derive(Clone, Debug)]
pub struct JacobiPreconditioner {
    inv_diag: Vec<f64>,
}

impl JacobiPreconditioner {
    /// Build from the diagonal of `matrix`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::ZeroDiagonal`] if any diagonal entry is zero
    /// or not finite.
    pub fn new(matrix: &SparseMatrix) -> Result<Self, SolverError> {
        let inv_diag = (0..matrix.size())
            .map(|i| {
                let d = matrix.get(i, i);
                if d == 0.0 || !d.is_finite() {
                    Err(SolverError::ZeroDiagonal { row: i })
                } else {
                    Ok(1.0 / d)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { inv_diag })
    }

    /// Dimension of the preconditioned system.
    pub fn size(&self) -> usize {
        self.inv_diag.len()
    }
}

impl Preconditioner for JacobiPreconditioner {
    fn apply(&self, r: &[f64], z: &mut [f64]) {
        for ((zi, ri), d) in z.iter_mut().zip(r).zip(&self.inv_diag) {
            *zi = ri * d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_diagonal() {
        let mut m = SparseMatrix::new(2);
        m.set_value(0, 0, -4.0);
        m.set_value(0, 1, 1.0);
        m.set_value(1, 1, 2.0);
        let p = JacobiPreconditioner::new(&m).unwrap();
        let mut z = [0.0; 2];
        p.apply(&[1.0, 1.0], &mut z);
        assert_eq!(z, [-0.25, 0.5]);
    }

    #[test]
    fn rejects_zero_diagonal() {
        let mut m = SparseMatrix::new(2);
        m.set_value(0, 0, 1.0);
        assert_eq!(
            JacobiPreconditioner::new(&m).unwrap_err(),
            SolverError::ZeroDiagonal { row: 1 }
        );
    }
}
