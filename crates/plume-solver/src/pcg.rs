//! Preconditioned conjugate gradient.
//!
//! Works for symmetric definite systems of either sign: the pressure
//! matrix is negative definite, and with a Jacobi preconditioner built
//! from the same matrix every step-length ratio stays positive.

use crate::error::{check_len, SolverError};
use crate::matrix::SparseMatrix;
use crate::preconditioner::Preconditioner;
use crate::vector::{axpy, dot, inf_norm, xpby};
use log::trace;

/// Stopping rule for [`solve`].
///
/// The solve succeeds as soon as either error measure drops to its
/// threshold. Errors are infinity norms of the residual `b - A x`; the
/// relative error divides by the infinity norm of `b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerminationCriteria {
    /// Maximum number of iterations.
    pub iterations: usize,
    /// Relative residual threshold.
    pub relative_error: f64,
    /// Absolute residual threshold.
    pub absolute_error: f64,
}

impl Default for TerminationCriteria {
    fn default() -> Self {
        Self {
            iterations: 100,
            relative_error: 1e-4,
            absolute_error: 1e-4,
        }
    }
}

/// Outcome of a solve.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SolverState {
    /// Whether a termination threshold was met.
    pub success: bool,
    /// Iterations performed.
    pub iterations: usize,
    /// Final absolute residual (infinity norm).
    pub absolute_error: f64,
    /// Final relative residual.
    pub relative_error: f64,
}

impl SolverState {
    /// State for a system with nothing to solve.
    pub fn trivial() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }
}

/// Cooperative cancellation hook, polled once per iteration.
pub trait Interrupter {
    /// Return `true` to abandon the solve. An interrupted solve reports failure.
    fn interrupted(&self) -> bool;
}

/// Never interrupts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullInterrupter;

impl Interrupter for NullInterrupter {
    fn interrupted(&self) -> bool {
        false
    }
}

/// Solve `A x = b` in place, starting from the initial guess in `x`.
///
/// # Errors
///
/// Returns [`SolverError::DimensionMismatch`] if `b` or `x` does not match
/// the matrix dimension. Failure to converge is reported through
/// [`SolverState::success`], never as an error.
pub fn solve(
    matrix: &SparseMatrix,
    b: &[f64],
    x: &mut [f64],
    preconditioner: &dyn Preconditioner,
    interrupter: &dyn Interrupter,
    criteria: TerminationCriteria,
) -> Result<SolverState, SolverError> {
    let n = matrix.size();
    check_len("b", n, b.len())?;
    check_len("x", n, x.len())?;

    let b_norm = inf_norm(b);
    let measure = |r: &[f64], iterations: usize| {
        let absolute_error = inf_norm(r);
        let relative_error = if b_norm > 0.0 {
            absolute_error / b_norm
        } else {
            absolute_error
        };
        SolverState {
            success: absolute_error <= criteria.absolute_error
                || relative_error <= criteria.relative_error,
            iterations,
            absolute_error,
            relative_error,
        }
    };

    if b_norm == 0.0 {
        x.fill(0.0);
        return Ok(SolverState::trivial());
    }

    let mut r = vec![0.0; n];
    matrix.mul_vec_unchecked(x, &mut r);
    for (ri, bi) in r.iter_mut().zip(b) {
        *ri = bi - *ri;
    }
    let mut state = measure(&r, 0);
    if state.success {
        return Ok(state);
    }

    let mut z = vec![0.0; n];
    preconditioner.apply(&r, &mut z);
    let mut p = z.clone();
    let mut q = vec![0.0; n];
    let mut rz = dot(&r, &z);

    for iteration in 1..=criteria.iterations {
        if interrupter.interrupted() {
            trace!("pcg interrupted after {} iterations", iteration - 1);
            state.success = false;
            return Ok(state);
        }
        matrix.mul_vec_unchecked(&p, &mut q);
        let pq = dot(&p, &q);
        if pq == 0.0 || !pq.is_finite() {
            break;
        }
        let alpha = rz / pq;
        axpy(alpha, &p, x);
        axpy(-alpha, &q, &mut r);

        state = measure(&r, iteration);
        if state.success {
            break;
        }

        preconditioner.apply(&r, &mut z);
        let rz_next = dot(&r, &z);
        xpby(&z, rz_next / rz, &mut p);
        rz = rz_next;
    }

    trace!(
        "pcg: n={} iterations={} abs={:e} rel={:e} success={}",
        n,
        state.iterations,
        state.absolute_error,
        state.relative_error,
        state.success
    );
    Ok(state)
}
