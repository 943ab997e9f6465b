//! Lognormal (Black–Scholes) dynamics with a flat rate and volatility.
//!
//! `dS/S = r dt + σ dW`
//!
//! The exact log-increment over `Δ` is `Normal((r − σ²/2)Δ, σ√Δ)`. The
//! Euler scheme works in price space (`μ = r·S`, `σ·S`).

use crate::stochastic_process::Diffusion1D;
use mc_core::{ensure, errors::Result, Rate, Real, Time, Volatility};
use num_complex::Complex64;

/// Parameters of the lognormal model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawLognormalSpec")
)]
pub struct LognormalSpec {
    spot: Real,
    rate: Rate,
    vol: Volatility,
}

/// Unvalidated wire form; deserialization goes through [`LognormalSpec::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawLognormalSpec {
    spot: Real,
    rate: Rate,
    vol: Volatility,
}

#[cfg(feature = "serde")]
impl TryFrom<RawLognormalSpec> for LognormalSpec {
    type Error = mc_core::Error;

    fn try_from(raw: RawLognormalSpec) -> Result<Self> {
        Self::new(raw.spot, raw.rate, raw.vol)
    }
}

impl LognormalSpec {
    /// Create the model. Requires `spot > 0` and `vol ≥ 0`, all finite.
    pub fn new(spot: Real, rate: Rate, vol: Volatility) -> Result<Self> {
        ensure!(spot.is_finite() && spot > 0.0, "spot must be positive, got {spot}");
        ensure!(rate.is_finite(), "rate must be finite, got {rate}");
        ensure!(vol.is_finite() && vol >= 0.0, "volatility must be non-negative, got {vol}");
        Ok(Self { spot, rate, vol })
    }

    /// Initial spot.
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// Risk-free rate `r`.
    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// Volatility `σ`. Negative only on a [`mirrored`](Self::mirrored) twin.
    pub fn vol(&self) -> Volatility {
        self.vol
    }

    /// The same model with `σ → −σ`.
    ///
    /// Driven by the same Gaussian stream, the mirrored model produces the
    /// antithetic path.
    pub fn mirrored(&self) -> Self {
        Self {
            vol: -self.vol,
            ..*self
        }
    }

    /// Log-space drift `r − σ²/2`.
    pub fn log_drift(&self) -> Real {
        self.rate - 0.5 * self.vol * self.vol
    }

    /// Log-space diffusion `σ`.
    pub fn log_diffusion(&self) -> Real {
        self.vol
    }

    /// Mean and standard deviation of `log(S_{t+Δ}/S_t)`.
    pub fn log_increment(&self, dt: Time) -> (Real, Real) {
        (self.log_drift() * dt, self.vol * dt.sqrt())
    }

    /// Exact step `S·exp((r − σ²/2)Δ + σ√Δ·z)`.
    pub fn exact_step(&self, s: Real, dt: Time, z: Real) -> Real {
        let (mean, sd) = self.log_increment(dt);
        s * (mean + sd * z).exp()
    }

    /// Euler step in price space, `S + r·S·Δ + σ·S·√Δ·z`.
    pub fn euler_step(&self, s: Real, dt: Time, z: Real) -> Real {
        self.evolve(0.0, s, dt, z)
    }

    /// Characteristic function of `log S_t`:
    /// `exp(iu(log S₀ + (r − σ²/2)t) − σ²t·u²/2)`.
    pub fn log_spot_cf(&self, t: Time, u: Real) -> Complex64 {
        let mean = self.spot.ln() + self.log_drift() * t;
        let variance = self.vol * self.vol * t;
        Complex64::new(-0.5 * variance * u * u, mean * u).exp()
    }
}

impl Diffusion1D for LognormalSpec {
    fn x0(&self) -> Real {
        self.spot
    }

    fn drift(&self, _t: Time, x: Real) -> Real {
        self.rate * x
    }

    fn diffusion(&self, _t: Time, x: Real) -> Real {
        self.vol * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn model() -> LognormalSpec {
        LognormalSpec::new(100.0, 0.05, 0.2).unwrap()
    }

    #[test]
    fn validation() {
        assert!(LognormalSpec::new(0.0, 0.05, 0.2).is_err());
        assert!(LognormalSpec::new(100.0, 0.05, -0.2).is_err());
        assert!(LognormalSpec::new(100.0, f64::INFINITY, 0.2).is_err());
        assert!(LognormalSpec::new(100.0, 0.05, 0.0).is_ok());
    }

    #[test]
    fn euler_coefficients() {
        let m = model();
        assert_relative_eq!(m.drift(0.0, 100.0), 5.0);
        assert_relative_eq!(m.diffusion(0.0, 100.0), 20.0);
        assert_relative_eq!(m.log_drift(), 0.03);
        assert_relative_eq!(m.log_diffusion(), 0.2);
    }

    #[test]
    fn exact_step_is_lognormal() {
        let m = model();
        let s = m.exact_step(100.0, 1.0, 1.0);
        assert_relative_eq!(s, 100.0 * (0.03_f64 + 0.2).exp(), max_relative = 1e-14);
    }

    #[test]
    fn euler_step_in_price_space() {
        let s = model().euler_step(100.0, 0.25, 1.0);
        assert_relative_eq!(s, 100.0 + 5.0 * 0.25 + 20.0 * 0.5, max_relative = 1e-14);
    }

    #[test]
    fn mirrored_step_is_antithetic() {
        let m = model();
        let up = m.exact_step(100.0, 1.0, 0.7);
        let down = m.mirrored().exact_step(100.0, 1.0, 0.7);
        assert_relative_eq!(up * down, 100.0 * 100.0 * (2.0 * 0.03_f64).exp(), max_relative = 1e-12);
        assert_eq!(m.mirrored().mirrored(), m);
    }

    #[test]
    fn log_spot_cf_moments() {
        let m = model();
        let cf = |u: Real| m.log_spot_cf(1.0, u);
        assert_abs_diff_eq!(cf(0.0).re, 1.0, epsilon = 1e-15);
        let (mean, var) = mc_math::characteristic_function::moments(&cf);
        assert_abs_diff_eq!(mean, 100.0_f64.ln() + 0.03, epsilon = 1e-5);
        assert_abs_diff_eq!(var, 0.04, epsilon = 1e-4);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialization_is_validated() {
        let json = serde_json::to_value(model()).unwrap();
        assert_eq!(serde_json::from_value::<LognormalSpec>(json).unwrap(), model());
        let bad = serde_json::json!({ "spot": -1.0, "rate": 0.05, "vol": 0.2 });
        assert!(serde_json::from_value::<LognormalSpec>(bad).is_err());
    }
}
