//! Row-insertable sparse matrix.

use crate::error::{check_len, SolverError};
use smallvec::SmallVec;

/// Seven entries cover a 3D Laplacian row (diagonal plus six neighbours)
/// without spilling to the heap.
type Row = SmallVec<[(usize, f64); 7]>;

/// Square sparse matrix stored as one small vector of `(column, value)`
/// pairs per row.
///
/// Rows are filled one entry at a time, in any column order. Repeated
/// writes to the same entry overwrite it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseMatrix {
    rows: Vec<Row>,
}

impl SparseMatrix {
    /// An `n x n` matrix with no stored entries.
    pub fn new(n: usize) -> Self {
        Self {
            rows: vec![Row::new(); n],
        }
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Total stored entries across all rows.
    pub fn nonzeros(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    /// Store `value` at `(row, col)`, overwriting any existing entry.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    pub fn set_value(&mut self, row: usize, col: usize, value: f64) {
        let r = &mut self.rows[row];
        match r.iter_mut().find(|(c, _)| *c == col) {
            Some(entry) => entry.1 = value,
            None => r.push((col, value)),
        }
    }

    /// Stored value at `(row, col)`, or zero.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.rows
            .get(row)
            .and_then(|r| r.iter().find(|(c, _)| *c == col))
            .map_or(0.0, |&(_, v)| v)
    }

    /// Stored entries of one row, in insertion order.
    pub fn row(&self, row: usize) -> &[(usize, f64)] {
        self.rows.get(row).map_or(&[], |r| r.as_slice())
    }

    /// Multiply every stored entry of a row by `scale`.
    pub fn scale_row(&mut self, row: usize, scale: f64) {
        if let Some(r) = self.rows.get_mut(row) {
            for (_, v) in r.iter_mut() {
                *v *= scale;
            }
        }
    }

    /// Compute `out = A x`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::DimensionMismatch`] if `x` or `out` has the
    /// wrong length.
    pub fn mul_vec(&self, x: &[f64], out: &mut [f64]) -> Result<(), SolverError> {
        check_len("x", self.size(), x.len())?;
        check_len("out", self.size(), out.len())?;
        self.mul_vec_unchecked(x, out);
        Ok(())
    }

    pub(crate) fn mul_vec_unchecked(&self, x: &[f64], out: &mut [f64]) {
        for (o, row) in out.iter_mut().zip(&self.rows) {
            *o = row.iter().map(|&(c, v)| v * x[c]).sum();
        }
    }

    /// Whether `A[i][j] == A[j][i]` within `tolerance` for every stored entry.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        self.rows.iter().enumerate().all(|(i, row)| {
            row.iter()
                .all(|&(j, v)| (self.get(j, i) - v).abs() <= tolerance)
        })
    }
}
