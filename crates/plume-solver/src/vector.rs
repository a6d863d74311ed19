//! Dense vector kernels used by the conjugate-gradient iteration.
//!
//! Callers guarantee equal lengths; the solver checks dimensions once up
//! front instead of on every kernel call.

/// Inner product of `a` and `b`.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Largest absolute entry, or zero for an empty vector.
pub fn inf_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}

/// `y += alpha * x`.
pub fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// `y = x + beta * y`.
pub fn xpby(x: &[f64], beta: f64, y: &mut [f64]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi = xi + beta * *yi;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernels() {
        let a = [1.0, -2.0, 3.0];
        let mut b = [4.0, 5.0, 6.0];
        assert_eq!(dot(&a, &b), 12.0);
        assert_eq!(inf_norm(&a), 3.0);
        assert_eq!(inf_norm(&[]), 0.0);
        axpy(2.0, &a, &mut b);
        assert_eq!(b, [6.0, 1.0, 12.0]);
        xpby(&a, 0.5, &mut b);
        assert_eq!(b, [4.0, -1.5, 9.0]);
    }
}
