//! Cubic interpolation over a unit-spaced grid.

use crate::error::{DriftError, Result};

/// Minimum number of knots for a not-a-knot cubic spline.
pub const MIN_KNOTS: usize = 4;

/// Not-a-knot cubic spline through `(i, values[i])`, `i = 0..n`.
///
/// The third derivative is continuous across the second and the
/// second-to-last knot, so any cubic polynomial is reproduced exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    values: Vec<f64>,
    /// Second derivative at each knot.
    curvature: Vec<f64>,
}

impl CubicSpline {
    pub fn new(values: Vec<f64>) -> Result<Self> {
        let n = values.len();
        if n < MIN_KNOTS {
            return Err(DriftError::InsufficientSamples {
                found: n,
                required: MIN_KNOTS,
            });
        }

        // Interior equations M[i-1] + 4 M[i] + M[i+1] = 6 Δ²y[i] for i = 1..n-1.
        // Substituting the not-a-knot closures M[0] = 2 M[1] - M[2] and
        // M[n-1] = 2 M[n-2] - M[n-3] collapses the first and last rows to 6 M.
        let m = n - 2;
        let mut sub = vec![1.0; m];
        let mut diag = vec![4.0; m];
        let mut sup = vec![1.0; m];
        let rhs: Vec<f64> = (1..n - 1)
            .map(|i| 6.0 * (values[i + 1] - 2.0 * values[i] + values[i - 1]))
            .collect();
        sub[0] = 0.0;
        diag[0] = 6.0;
        sup[0] = 0.0;
        sub[m - 1] = 0.0;
        diag[m - 1] = 6.0;
        sup[m - 1] = 0.0;

        let interior = thomas_solve(&sub, &diag, &sup, &rhs);
        let mut curvature = Vec::with_capacity(n);
        curvature.push(2.0 * interior[0] - interior[1]);
        curvature.extend_from_slice(&interior);
        curvature.push(2.0 * interior[m - 1] - interior[m - 2]);

        Ok(Self { values, curvature })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Evaluates the spline at `s`. Outside `[0, n-1]` the end pieces are extended.
    pub fn eval(&self, s: f64) -> f64 {
        let last = self.values.len() - 1;
        let i = (s.floor().max(0.0) as usize).min(last - 1);
        let t = s - i as f64;
        let u = 1.0 - t;
        u * self.values[i]
            + t * self.values[i + 1]
            + ((u * u * u - u) * self.curvature[i] + (t * t * t - t) * self.curvature[i + 1]) / 6.0
    }
}

/// Solves a tridiagonal system with the Thomas algorithm.
///
/// `sub[0]` and `sup[n-1]` are ignored. The system must be diagonally
/// dominant (the spline system always is).
pub fn thomas_solve(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = rhs.len();
    debug_assert!(sub.len() == n && diag.len() == n && sup.len() == n);

    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];
    c[0] = sup[0] / diag[0];
    d[0] = rhs[0] / diag[0];
    for i in 1..n {
        let den = diag[i] - sub[i] * c[i - 1];
        if i < n - 1 {
            c[i] = sup[i] / den;
        }
        d[i] = (rhs[i] - sub[i] * d[i - 1]) / den;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d[i] - c[i] * x[i + 1];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_input() {
        let err = CubicSpline::new(vec![1.0, 2.0, 3.0]).expect_err("three knots");
        assert!(matches!(
            err,
            DriftError::InsufficientSamples {
                found: 3,
                required: 4
            }
        ));
    }

    #[test]
    fn passes_through_knots() {
        let values: Vec<f64> = (0..12).map(|i| (i as f64 * 0.7).sin()).collect();
        let spline = CubicSpline::new(values.clone()).expect("spline");
        for (i, v) in values.iter().enumerate() {
            assert!((spline.eval(i as f64) - v).abs() < 1e-12);
        }
    }

    #[test]
    fn reproduces_cubics_exactly() {
        let f = |s: f64| 0.5 * s * s * s - 2.0 * s * s + s - 7.0;
        for n in [4usize, 5, 9] {
            let spline = CubicSpline::new((0..n).map(|i| f(i as f64)).collect()).expect("spline");
            for k in 0..=(10 * (n - 1)) {
                let s = k as f64 / 10.0;
                assert!(
                    (spline.eval(s) - f(s)).abs() < 1e-9,
                    "n={n} s={s}: {} vs {}",
                    spline.eval(s),
                    f(s)
                );
            }
        }
    }

    #[test]
    fn approximates_smooth_function_between_knots() {
        let spline =
            CubicSpline::new((0..40).map(|i| (i as f64 / 6.0).cos()).collect()).expect("spline");
        for k in 0..390 {
            let s = k as f64 / 10.0 + 0.05;
            assert!((spline.eval(s) - (s / 6.0).cos()).abs() < 1e-4);
        }
    }

    #[test]
    fn thomas_solves_small_system() {
        let x = thomas_solve(&[0.0, 1.0, 1.0], &[4.0, 4.0, 4.0], &[1.0, 1.0, 0.0], &[5.0, 6.0, 5.0]);
        for v in x {
            assert!((v - 1.0).abs() < 1e-12);
        }
    }
}
