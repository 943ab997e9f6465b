//! Square-root (CIR) process, the variance factor of the Heston model.
//!
//! ```text
//! dV = κ(θ − V) dt + σ √V dW
//! ```
//!
//! Over a finite interval `Δ` the transition is a scaled non-central
//! chi-square:
//!
//! ```text
//! V_{t+Δ} = c · χ'²(d, λ),   d = 4κθ/σ²,
//! c = σ²(1 − e^{−κΔ}) / (4κ),   λ = V_t e^{−κΔ} / c
//! ```

use crate::stochastic_process::Diffusion1D;
use mc_core::{ensure, errors::Result, Real, Time};
use mc_math::NonCentralChiSquare;
use rand::Rng;

/// A square-root (CIR) process `dV = speed·(mean − V) dt + volatility·√V dW`.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareRootProcess {
    x0: Real,
    speed: Real,
    mean: Real,
    volatility: Real,
}

/// The exact transition law of a [`SquareRootProcess`] over one interval.
#[derive(Debug, Clone)]
pub struct SquareRootTransition {
    scale: Real,
    law: NonCentralChiSquare,
}

impl SquareRootTransition {
    /// Scale factor `c`.
    pub fn scale(&self) -> Real {
        self.scale
    }

    /// The unscaled non-central chi-square law.
    pub fn law(&self) -> &NonCentralChiSquare {
        &self.law
    }

    /// `E[V_{t+Δ} | V_t]`.
    pub fn mean(&self) -> Real {
        self.scale * self.law.mean()
    }

    /// `Var[V_{t+Δ} | V_t]`.
    pub fn variance(&self) -> Real {
        self.scale * self.scale * self.law.variance()
    }

    /// Draw `V_{t+Δ}`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Real {
        self.scale * self.law.sample(rng)
    }
}

impl SquareRootProcess {
    /// Create a square-root process.
    ///
    /// Requires `speed > 0`, `mean > 0`, `volatility > 0` and `x0 ≥ 0`.
    pub fn new(speed: Real, mean: Real, volatility: Real, x0: Real) -> Result<Self> {
        ensure!(speed.is_finite() && speed > 0.0, "mean-reversion speed must be positive, got {speed}");
        ensure!(mean.is_finite() && mean > 0.0, "long-run mean must be positive, got {mean}");
        ensure!(
            volatility.is_finite() && volatility > 0.0,
            "volatility must be positive, got {volatility}"
        );
        ensure!(x0.is_finite() && x0 >= 0.0, "initial value must be non-negative, got {x0}");
        Ok(Self {
            x0,
            speed,
            mean,
            volatility,
        })
    }

    /// Build from parameters already validated by the caller.
    pub(crate) fn from_validated(speed: Real, mean: Real, volatility: Real, x0: Real) -> Self {
        Self {
            x0,
            speed,
            mean,
            volatility,
        }
    }

    /// Mean-reversion speed `κ`.
    pub fn speed(&self) -> Real {
        self.speed
    }

    /// Long-run level `θ`.
    pub fn mean(&self) -> Real {
        self.mean
    }

    /// Volatility `σ`.
    pub fn volatility(&self) -> Real {
        self.volatility
    }

    /// Degrees of freedom `d = 4κθ/σ²` of the transition law.
    pub fn degrees_of_freedom(&self) -> Real {
        4.0 * self.speed * self.mean / (self.volatility * self.volatility)
    }

    /// Whether `2κθ ≥ σ²`, i.e. zero is unattainable.
    pub fn satisfies_feller(&self) -> bool {
        2.0 * self.speed * self.mean >= self.volatility * self.volatility
    }

    /// `E[V_{t+Δ} | V_t = x] = θ + (x − θ)e^{−κΔ}`.
    pub fn conditional_mean(&self, x: Real, dt: Time) -> Real {
        self.mean + (x - self.mean) * (-self.speed * dt).exp()
    }

    /// Exact transition law from `x` over `dt`.
    pub fn transition(&self, x: Real, dt: Time) -> Result<SquareRootTransition> {
        ensure!(dt > 0.0, "transition interval must be positive, got {dt}");
        let decay = (-self.speed * dt).exp();
        let scale = self.volatility * self.volatility * (1.0 - decay) / (4.0 * self.speed);
        let noncentrality = x.max(0.0) * decay / scale;
        let law = NonCentralChiSquare::new(self.degrees_of_freedom(), noncentrality)?;
        Ok(SquareRootTransition { scale, law })
    }
}

impl Diffusion1D for SquareRootProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, _t: Time, x: Real) -> Real {
        self.speed * (self.mean - x.max(0.0))
    }

    fn diffusion(&self, _t: Time, x: Real) -> Real {
        self.volatility * x.max(0.0).sqrt()
    }

    /// Full truncation: `v⁺` in both coefficients, result floored at zero.
    fn evolve(&self, t: Time, x: Real, dt: Time, dw: Real) -> Real {
        (self.expectation(t, x, dt) + self.std_deviation(t, x, dt) * dw).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mc_math::{PathRng, Statistics};

    fn cir() -> SquareRootProcess {
        SquareRootProcess::new(1.5, 0.04, 0.3, 0.02).unwrap()
    }

    #[test]
    fn drift_vanishes_at_mean() {
        assert!(cir().drift(0.0, 0.04).abs() < 1e-15);
    }

    #[test]
    fn diffusion_vanishes_at_zero() {
        assert_eq!(cir().diffusion(0.0, 0.0), 0.0);
        assert_eq!(cir().diffusion(0.0, -0.01), 0.0);
    }

    #[test]
    fn drift_mean_reverts() {
        let p = cir();
        assert!(p.drift(0.0, 0.01) > 0.0);
        assert!(p.drift(0.0, 0.10) < 0.0);
    }

    #[test]
    fn euler_is_full_truncation() {
        let p = cir();
        assert_eq!(p.evolve(0.0, 0.001, 0.1, -10.0), 0.0);
        assert!(p.evolve(0.0, -0.01, 1.0, 0.0) > 0.0);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(SquareRootProcess::new(0.0, 0.04, 0.3, 0.02).is_err());
        assert!(SquareRootProcess::new(1.0, 0.04, 0.3, -0.02).is_err());
        assert!(SquareRootProcess::new(1.0, 0.04, f64::NAN, 0.02).is_err());
    }

    #[test]
    fn transition_moments_match_closed_form() {
        let p = cir();
        let dt = 0.5;
        let t = p.transition(0.02, dt).unwrap();
        assert_relative_eq!(t.mean(), p.conditional_mean(0.02, dt), max_relative = 1e-12);
        let mut rng = PathRng::new(17);
        let mut stats = Statistics::new();
        for _ in 0..40_000 {
            let v = t.sample(&mut rng);
            assert!(v >= 0.0);
            stats.add(v);
        }
        let mean = stats.mean().unwrap();
        assert!((mean - t.mean()).abs() < 4.0 * (t.variance() / 40_000.0).sqrt());
    }

    #[test]
    fn feller_condition() {
        assert!(cir().satisfies_feller());
        let rough = SquareRootProcess::new(6.21, 0.019, 0.61, 0.010201).unwrap();
        assert!(!rough.satisfies_feller());
    }
}
