//! Polynomial least-squares regression.
//!
//! Solves `y = A β + ε` by SVD with small singular values thresholded, where
//! `A` is the Vandermonde design matrix of the regressors. This is the
//! regression step of Longstaff-Schwartz: continuation values regressed on
//! in-the-money spot levels.
//!
//! Regressors are rescaled to `x / max|x|` before the design matrix is built
//! so that high powers of spot levels (≈ 10² … 10⁸) stay well conditioned;
//! [`PolynomialRegression::coefficients`] reports the coefficients in the
//! original, unscaled basis.

use mc_core::{
    ensure,
    errors::{Error, Result},
    Real,
};
use nalgebra::{DMatrix, DVector};

/// Solve the least-squares problem `min ‖A β − y‖` by thresholded SVD.
///
/// * `a` — the *n × m* design matrix.
/// * `y` — dependent variable observations (length *n*).
pub fn solve_least_squares(a: &DMatrix<Real>, y: &[Real]) -> Result<DVector<Real>> {
    let n = a.nrows();
    let m = a.ncols();
    ensure!(
        y.len() == n,
        "y length ({}) must equal number of rows of A ({n})",
        y.len()
    );

    let svd = a.clone().svd(true, true);
    let u = svd
        .u
        .as_ref()
        .ok_or_else(|| Error::Runtime("SVD did not produce U".into()))?;
    let v_t = svd
        .v_t
        .as_ref()
        .ok_or_else(|| Error::Runtime("SVD did not produce Vᵀ".into()))?;
    let sv = &svd.singular_values;

    // Threshold: max(n,m) * eps * max(singular_values)
    let sv_max = sv.iter().copied().fold(0.0_f64, f64::max);
    let threshold = n.max(m) as Real * f64::EPSILON * sv_max;

    // β = V * diag(1/sᵢ) * Uᵀ * y  (only for sᵢ > threshold)
    let y_vec = DVector::from_column_slice(y);
    let ut_y = u.transpose() * &y_vec;

    let mut beta = DVector::zeros(m);
    for k in 0..sv.len() {
        let s = sv[k];
        if s > threshold {
            let ratio = ut_y[k] / s;
            for j in 0..m {
                beta[j] += ratio * v_t[(k, j)];
            }
        }
    }
    Ok(beta)
}

/// A fitted polynomial `f(x) ≈ Σ cᵢ xⁱ`, `i = 0..=degree`.
#[derive(Debug, Clone)]
pub struct PolynomialRegression {
    /// Coefficients in the scaled variable `x / scale`.
    scaled_coefficients: Vec<Real>,
    scale: Real,
}

impl PolynomialRegression {
    /// Fit a polynomial of the given degree by ordinary least squares.
    ///
    /// Requires `x.len() == y.len()` and at least `degree + 1` observations.
    pub fn fit(x: &[Real], y: &[Real], degree: usize) -> Result<Self> {
        let n = x.len();
        let m = degree + 1;
        if n != y.len() {
            return Err(Error::InvalidArgument(
                "x and y must have the same length".into(),
            ));
        }
        if n < m {
            return Err(Error::InvalidArgument(format!(
                "degree {degree} needs at least {m} observations, got {n}"
            )));
        }

        let scale = x.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let scale = if scale > 0.0 { scale } else { 1.0 };

        let a = DMatrix::from_fn(n, m, |i, j| (x[i] / scale).powi(j as i32));
        let beta = solve_least_squares(&a, y)?;

        Ok(Self {
            scaled_coefficients: beta.iter().copied().collect(),
            scale,
        })
    }

    /// Polynomial degree.
    pub fn degree(&self) -> usize {
        self.scaled_coefficients.len() - 1
    }

    /// Coefficients `cᵢ` of `Σ cᵢ xⁱ` in the original variable.
    pub fn coefficients(&self) -> Vec<Real> {
        self.scaled_coefficients
            .iter()
            .enumerate()
            .map(|(i, c)| c / self.scale.powi(i as i32))
            .collect()
    }

    /// Evaluate the fitted polynomial at `x` (Horner).
    pub fn predict(&self, x: Real) -> Real {
        let z = x / self.scale;
        self.scaled_coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * z + c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn linear_fit() {
        // y = 2 + 3x
        let x: Vec<Real> = (0..20).map(|i| i as Real).collect();
        let y: Vec<Real> = x.iter().map(|&xi| 2.0 + 3.0 * xi).collect();

        let reg = PolynomialRegression::fit(&x, &y, 1).unwrap();
        let c = reg.coefficients();
        assert_abs_diff_eq!(c[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c[1], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn quadratic_fit_at_spot_scale() {
        // y = 1 - 2x + 0.5x² on spot-like levels
        let x: Vec<Real> = (0..30).map(|i| 70.0 + i as Real).collect();
        let y: Vec<Real> = x.iter().map(|&xi| 1.0 - 2.0 * xi + 0.5 * xi * xi).collect();

        let reg = PolynomialRegression::fit(&x, &y, 2).unwrap();
        for &xi in &x {
            assert_abs_diff_eq!(reg.predict(xi), 1.0 - 2.0 * xi + 0.5 * xi * xi, epsilon = 1e-6);
        }
        let c = reg.coefficients();
        assert_abs_diff_eq!(c[2], 0.5, epsilon = 1e-8);
    }

    #[test]
    fn noisy_linear_fit() {
        let x: Vec<Real> = (0..100).map(|i| i as Real * 0.1).collect();
        let noise = [
            0.01, -0.02, 0.015, -0.005, 0.03, -0.01, 0.02, -0.03, 0.005, 0.01,
        ];
        let y: Vec<Real> = x
            .iter()
            .enumerate()
            .map(|(i, &xi)| 1.0 + 2.0 * xi + noise[i % noise.len()])
            .collect();

        let reg = PolynomialRegression::fit(&x, &y, 1).unwrap();
        let c = reg.coefficients();
        assert!((c[0] - 1.0).abs() < 0.1, "intercept = {}", c[0]);
        assert!((c[1] - 2.0).abs() < 0.01, "slope = {}", c[1]);
    }

    #[test]
    fn too_few_observations() {
        assert!(PolynomialRegression::fit(&[1.0], &[2.0], 1).is_err());
        assert!(PolynomialRegression::fit(&[1.0, 2.0], &[2.0], 0).is_err());
    }

    #[test]
    fn degenerate_regressors_do_not_blow_up() {
        // All x equal: the design matrix is rank one.
        let x = [5.0; 10];
        let y: Vec<Real> = (0..10).map(|i| i as Real).collect();
        let reg = PolynomialRegression::fit(&x, &y, 2).unwrap();
        assert_abs_diff_eq!(reg.predict(5.0), 4.5, epsilon = 1e-9);
    }

    proptest! {
        #[test]
        fn exact_polynomials_are_recovered(
            c0 in -5.0..5.0_f64,
            c1 in -1.0..1.0_f64,
            c2 in -0.05..0.05_f64,
        ) {
            let x: Vec<Real> = (0..25).map(|i| 80.0 + 2.0 * i as Real).collect();
            let y: Vec<Real> = x.iter().map(|&v| c0 + c1 * v + c2 * v * v).collect();
            let reg = PolynomialRegression::fit(&x, &y, 2).unwrap();
            for &v in &x {
                let expected = c0 + c1 * v + c2 * v * v;
                prop_assert!((reg.predict(v) - expected).abs() < 1e-6 * (1.0 + expected.abs()));
            }
        }
    }
}
