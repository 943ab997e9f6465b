//! Exact sampling of a non-negative random variable from its characteristic
//! function `φ(u) = E[e^{iuX}]` (Fourier inversion in the manner of
//! Broadie & Kaya, 2006).
//!
//! The distribution function on `[0, π/h]` is recovered from the cosine
//! series of the density,
//!
//! ```text
//! F(x) = h·x/π + (2/π) Σ_{j≥1} sin(h·j·x)/j · Re φ(h·j)
//! ```
//!
//! with `h = π / (mean + n·sd)`, and a uniform draw `u` is mapped to `x` by
//! solving `F(x) = u`: a damped secant iteration first, bisection on
//! `[0, mean + 11·sd]` as the fallback. A draw never fails: when no root can
//! be bracketed the upper bound is returned and tagged
//! [`Confidence::LowConfidence`].

use crate::distributions::normal_cdf_inverse;
use crate::random_numbers::PathRng;
use crate::solvers1d::{bisection, secant, RootOutcome};
use mc_core::Real;
use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::{debug, warn};

/// Finite-difference step used for the moments at `u = 0`.
pub const DEFAULT_FD_STEP: Real = 1e-4;

/// Lower bound applied to the moment-matched variance.
pub const VARIANCE_FLOOR: Real = 1e-12;

/// Default truncation tolerance `ε` of the Fourier series.
pub const DEFAULT_CDF_TOLERANCE: Real = 1e-4;

/// Hard cap on the number of Fourier terms.
pub const MAX_SERIES_TERMS: usize = 1_000_000_000;

/// A characteristic function `u ↦ E[e^{iuX}]`.
///
/// Implemented for every `Fn(Real) -> Complex64`, so closures capturing model
/// parameters can be passed directly.
pub trait CharacteristicFunction {
    /// Evaluate `φ(u)`.
    fn evaluate(&self, u: Real) -> Complex64;
}

impl<F> CharacteristicFunction for F
where
    F: Fn(Real) -> Complex64,
{
    fn evaluate(&self, u: Real) -> Complex64 {
        self(u)
    }
}

/// Tuning parameters of [`sample`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplerConfig {
    /// Standard deviations above the mean defining the series support, `n`.
    pub n_sigma: Real,
    /// Standard deviations above the mean bounding the bisection bracket.
    pub fallback_sigma: Real,
    /// Absolute tolerance on `F(x) − u`.
    pub atol: Real,
    /// Series truncation tolerance `ε`.
    pub cdf_tolerance: Real,
    /// Evaluation budget of the secant stage.
    pub newton_max_evals: usize,
    /// Evaluation budget of the bisection stage.
    pub bisection_max_evals: usize,
    /// Hard cap on the number of series terms.
    pub max_terms: usize,
    /// Finite-difference step for the moments.
    pub fd_step: Real,
    /// Floor on the moment-matched variance.
    pub variance_floor: Real,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            n_sigma: 7.0,
            fallback_sigma: 11.0,
            atol: 1e-6,
            cdf_tolerance: DEFAULT_CDF_TOLERANCE,
            newton_max_evals: 10,
            bisection_max_evals: 100,
            max_terms: MAX_SERIES_TERMS,
            fd_step: DEFAULT_FD_STEP,
            variance_floor: VARIANCE_FLOOR,
        }
    }
}

impl SamplerConfig {
    /// Set the root-finding tolerance.
    pub fn with_atol(mut self, atol: Real) -> Self {
        self.atol = atol;
        self
    }

    /// Set the series truncation tolerance.
    pub fn with_cdf_tolerance(mut self, tolerance: Real) -> Self {
        self.cdf_tolerance = tolerance;
        self
    }

    /// Set the number of standard deviations defining the series support.
    pub fn with_n_sigma(mut self, n_sigma: Real) -> Self {
        self.n_sigma = n_sigma;
        self
    }
}

/// How much trust to place in a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    /// `|F(x) − u| < atol`.
    Converged,
    /// Fallback value; precision is degraded.
    LowConfidence,
}

/// One draw from a characteristic function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CfSample {
    /// The sampled value.
    pub value: Real,
    /// Whether the inversion converged.
    pub confidence: Confidence,
    /// The Fourier step `h` the inversion used.
    pub fourier_step: Real,
}

impl CfSample {
    /// Whether the draw is a low-confidence fallback.
    pub fn is_low_confidence(&self) -> bool {
        self.confidence == Confidence::LowConfidence
    }
}

// ── Moments ───────────────────────────────────────────────────────────────────

/// Mean and variance from centred finite differences of `φ` at zero
/// (step [`DEFAULT_FD_STEP`], variance floored at [`VARIANCE_FLOOR`]).
pub fn moments<C>(cf: &C) -> (Real, Real)
where
    C: CharacteristicFunction + ?Sized,
{
    moments_with_step(cf, DEFAULT_FD_STEP, VARIANCE_FLOOR)
}

/// [`moments`] with an explicit step and floor.
///
/// `mean = −i·φ'(0)`, `variance = −φ''(0) − mean²`.
pub fn moments_with_step<C>(cf: &C, step: Real, floor: Real) -> (Real, Real)
where
    C: CharacteristicFunction + ?Sized,
{
    let up = cf.evaluate(step);
    let down = cf.evaluate(-step);
    let centre = cf.evaluate(0.0);

    let first = (up - down) / (2.0 * step);
    let second = (up - centre * 2.0 + down) / (step * step);

    let mean = (-Complex64::i() * first).re;
    let variance = -second.re - mean * mean;
    let variance = if variance.is_finite() {
        variance.max(floor)
    } else {
        floor
    };
    (mean, variance)
}

// ── Fourier series ────────────────────────────────────────────────────────────

/// The truncated cosine series of a density on `[0, π/h]`.
///
/// `Re φ(h·j)` is evaluated once per term at construction; every subsequent
/// CDF/PDF evaluation reuses the coefficients. The truncation point does not
/// depend on `x`, so the series is a fixed smooth function of `x`.
#[derive(Debug, Clone)]
pub struct FourierSeries {
    step: Real,
    coefficients: Vec<Real>,
    capped: bool,
}

impl FourierSeries {
    /// Build the series: terms are added until `|φ(h·j)|/j < π·ε/2` or
    /// `max_terms` is reached.
    pub fn new<C>(cf: &C, step: Real, tolerance: Real, max_terms: usize) -> Self
    where
        C: CharacteristicFunction + ?Sized,
    {
        let cutoff = 0.5 * PI * tolerance;
        let mut coefficients = Vec::new();
        let mut capped = true;
        for j in 1..=max_terms {
            let phi = cf.evaluate(step * j as Real);
            if !phi.re.is_finite() {
                capped = false;
                break;
            }
            coefficients.push(phi.re);
            if phi.norm() / (j as Real) < cutoff {
                capped = false;
                break;
            }
        }
        Self {
            step,
            coefficients,
            capped,
        }
    }

    /// The Fourier step `h`.
    pub fn step(&self) -> Real {
        self.step
    }

    /// Number of terms retained.
    pub fn terms(&self) -> usize {
        self.coefficients.len()
    }

    /// Whether the series hit the term cap before meeting its tolerance.
    pub fn is_capped(&self) -> bool {
        self.capped
    }

    /// Distribution function `F(x)`; exactly `0` for `x ≤ 0`.
    pub fn cdf(&self, x: Real) -> Real {
        if x <= 0.0 {
            return 0.0;
        }
        let hx = self.step * x;
        let sum: Real = self
            .coefficients
            .iter()
            .enumerate()
            .map(|(k, c)| {
                let j = (k + 1) as Real;
                (hx * j).sin() / j * c
            })
            .sum();
        hx / PI + 2.0 / PI * sum
    }

    /// Density `f(x) = F'(x)`; `0` for `x < 0`.
    pub fn pdf(&self, x: Real) -> Real {
        if x < 0.0 {
            return 0.0;
        }
        let hx = self.step * x;
        let sum: Real = self
            .coefficients
            .iter()
            .enumerate()
            .map(|(k, c)| (hx * (k + 1) as Real).cos() * c)
            .sum();
        self.step / PI * (1.0 + 2.0 * sum)
    }
}

/// `F(x)` of the law with characteristic function `cf`, for Fourier step `h`
/// and truncation tolerance `tolerance`. Returns `0` for `x < 0`.
pub fn cdf<C>(cf: &C, x: Real, h: Real, tolerance: Real) -> Real
where
    C: CharacteristicFunction + ?Sized,
{
    if x <= 0.0 {
        return 0.0;
    }
    FourierSeries::new(cf, h, tolerance, MAX_SERIES_TERMS).cdf(x)
}

/// Density of the law with characteristic function `cf` (see [`cdf`]).
pub fn pdf<C>(cf: &C, x: Real, h: Real, tolerance: Real) -> Real
where
    C: CharacteristicFunction + ?Sized,
{
    if x < 0.0 {
        return 0.0;
    }
    FourierSeries::new(cf, h, tolerance, MAX_SERIES_TERMS).pdf(x)
}

// ── Sampling ──────────────────────────────────────────────────────────────────

/// Draw one exact sample of the non-negative variable whose characteristic
/// function is `cf`, consuming one uniform from `rng`.
pub fn sample<C>(rng: &mut PathRng, cf: &C, config: &SamplerConfig) -> CfSample
where
    C: CharacteristicFunction + ?Sized,
{
    let u = rng.next_open_uniform();
    sample_with_uniform(u, cf, config)
}

/// Invert `F(x) = u` for a given uniform `u ∈ (0, 1)`.
pub fn sample_with_uniform<C>(u: Real, cf: &C, config: &SamplerConfig) -> CfSample
where
    C: CharacteristicFunction + ?Sized,
{
    let (mean, variance) = moments_with_step(cf, config.fd_step, config.variance_floor);
    let sd = variance.sqrt();
    let support = mean + config.n_sigma * sd;

    if !(support.is_finite() && support > 0.0) {
        warn!(
            mean,
            variance, "characteristic function has no usable support; returning zero"
        );
        return CfSample {
            value: 0.0,
            confidence: Confidence::LowConfidence,
            fourier_step: Real::NAN,
        };
    }

    let h = PI / support;
    let series = FourierSeries::new(cf, h, config.cdf_tolerance, config.max_terms);
    if series.is_capped() {
        debug!(terms = series.terms(), "fourier series hit its term cap");
    }
    let target = |x: Real| series.cdf(x) - u;

    // Moment-matched normal guess, kept strictly positive.
    let guess_floor = (1e-3 * mean.abs()).max(1e-12);
    let mut x0 = mean + sd * normal_cdf_inverse(u);
    if !(x0 > 0.0) {
        x0 = guess_floor;
    }

    if config.newton_max_evals > 0 {
        let f0 = target(x0);
        if f0.abs() < config.atol {
            return CfSample {
                value: x0,
                confidence: Confidence::Converged,
                fourier_step: h,
            };
        }
        let density = series.pdf(x0);
        let mut x1 = if density > 0.0 && density.is_finite() {
            x0 - f0 / density
        } else {
            x0 - f0.signum() * sd
        };
        if !(x1 > 0.0) {
            x1 = 0.5 * x0;
        }

        let budget = config.newton_max_evals.saturating_sub(1);
        match secant(target, x0, x1, 0.0, config.atol, budget) {
            RootOutcome::Converged(x) if x >= 0.0 => {
                return CfSample {
                    value: x,
                    confidence: Confidence::Converged,
                    fourier_step: h,
                };
            }
            outcome => {
                debug!(u, mean, variance, ?outcome, "secant inversion failed; bisecting");
            }
        }
    }

    let upper = mean + config.fallback_sigma * sd;
    match bisection(target, 0.0, upper, config.atol, config.bisection_max_evals) {
        RootOutcome::Converged(x) => CfSample {
            value: x,
            confidence: Confidence::Converged,
            fourier_step: h,
        },
        RootOutcome::LowConfidence(x) => {
            warn!(
                u,
                mean,
                variance,
                upper,
                value = x,
                "characteristic-function inversion did not converge; using fallback value"
            );
            CfSample {
                value: x,
                confidence: Confidence::LowConfidence,
                fourier_step: h,
            }
        }
    }
}
