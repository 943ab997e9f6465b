//! Modified Bessel function of the first kind, `I_ν(z)`, for real order
//! `ν > −1` and complex argument.
//!
//! Only the logarithm is exposed: the Broadie–Kaya conditional characteristic
//! function needs the *ratio* of two Bessel values whose individual
//! magnitudes overflow `f64` for short time steps (`|z|` of several hundred).
//!
//! * `|z| < 17`: ascending power series
//!   `I_ν(z) = (z/2)^ν Σ_k (z²/4)^k / (k! Γ(ν+k+1))`.
//! * otherwise: the Hankel expansion with its recessive term,
//!   `I_ν(z) ~ [e^z Σ_k (−1)^k a_k(ν)/z^k + e^{−z ± (ν+½)πi} Σ_k a_k(ν)/z^k] / √(2πz)`,
//!   which stays accurate up to the imaginary axis; `Re z < 0` is reflected
//!   through `I_ν(w·e^{±πi}) = e^{±νπi} I_ν(w)`.
//!
//! Fractional powers use the principal branch; see
//! [`log_bessel_i_continued`] for other sheets.

use mc_core::Real;
use num_complex::Complex64;
use statrs::function::gamma::ln_gamma;
use std::f64::consts::PI;

const ASYMPTOTIC_MODULUS: Real = 17.0;
const MAX_SERIES_TERMS: usize = 2_000;
const MAX_ASYMPTOTIC_TERMS: usize = 80;

/// `ln I_ν(z)` (principal branch).
///
/// Returns `−∞` for `z = 0` and `ν > 0`.
pub fn log_bessel_i(nu: Real, z: Complex64) -> Complex64 {
    if z.norm() >= ASYMPTOTIC_MODULUS {
        log_asymptotic(nu, z)
    } else {
        log_series(nu, z)
    }
}

/// `ln I_ν(z)` for `z = exp(log_z)`, continued along the branch of `log_z`
/// rather than the principal one: `I_ν(z·e^{2πim}) = e^{2πiνm} I_ν(z)`.
///
/// Callers that track `arg z` continuously (the argument of the Broadie–Kaya
/// Bessel terms winds around the origin as the transform variable grows)
/// pass the continuous logarithm here.
pub fn log_bessel_i_continued(nu: Real, log_z: Complex64) -> Complex64 {
    let z = log_z.exp();
    log_bessel_i(nu, z) + nu * (log_z - z.ln())
}

/// `I_ν(z)`; overflows for large `|z|`, prefer [`log_bessel_i`].
pub fn bessel_i(nu: Real, z: Complex64) -> Complex64 {
    log_bessel_i(nu, z).exp()
}

fn log_series(nu: Real, z: Complex64) -> Complex64 {
    if z.norm() == 0.0 {
        return if nu == 0.0 {
            Complex64::new(0.0, 0.0)
        } else {
            Complex64::new(f64::NEG_INFINITY, 0.0)
        };
    }
    let q = z * z * 0.25;
    let half_modulus = 0.5 * z.norm();
    let mut term = Complex64::new(1.0, 0.0);
    let mut sum = term;
    for k in 1..MAX_SERIES_TERMS {
        let k = k as Real;
        term *= q / (k * (nu + k));
        sum += term;
        if k > half_modulus && term.norm() <= f64::EPSILON * sum.norm() {
            break;
        }
    }
    nu * (z * 0.5).ln() + sum.ln() - ln_gamma(nu + 1.0)
}

fn log_asymptotic(nu: Real, z: Complex64) -> Complex64 {
    if z.re < 0.0 {
        let turn = if z.im >= 0.0 { PI } else { -PI };
        return log_asymptotic(nu, -z) + Complex64::new(0.0, turn * nu);
    }
    let mu = 4.0 * nu * nu;
    // term = a_k(ν) / z^k
    let mut term = Complex64::new(1.0, 0.0);
    let mut alternating = term;
    let mut plain = term;
    let mut previous = 1.0;
    for k in 1..=MAX_ASYMPTOTIC_TERMS {
        let odd = (2 * k - 1) as Real;
        let next = term * (mu - odd * odd) / (8.0 * k as Real * z);
        let size = next.norm();
        // The expansion is divergent: stop at its smallest term.
        if size > previous {
            break;
        }
        term = next;
        if k % 2 == 1 {
            alternating -= term;
        } else {
            alternating += term;
        }
        plain += term;
        if size < f64::EPSILON {
            break;
        }
        previous = size;
    }
    let side = if z.im >= 0.0 { 1.0 } else { -1.0 };
    let recessive = (-2.0 * z + Complex64::new(0.0, side * (nu + 0.5) * PI)).exp() * plain;
    z - 0.5 * (z * (2.0 * PI)).ln() + (alternating + recessive).ln()
}
