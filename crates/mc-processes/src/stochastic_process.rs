//! `Diffusion1D`: the Euler–Maruyama view of a scalar diffusion
//! `dX = μ(t, X) dt + σ(t, X) dW`.
//!
//! Implemented by the lognormal price process and by the square-root
//! variance factor of the Heston model; the path simulator drives both
//! through [`Diffusion1D::evolve`].

use mc_core::{Real, Time};

/// A scalar diffusion described by its drift and diffusion coefficients.
pub trait Diffusion1D: std::fmt::Debug + Send + Sync {
    /// Initial value of the process.
    fn x0(&self) -> Real;

    /// Drift `μ(t, x)`.
    fn drift(&self, t: Time, x: Real) -> Real;

    /// Diffusion `σ(t, x)`.
    fn diffusion(&self, t: Time, x: Real) -> Real;

    /// First-order expectation `x + μ(t, x)·Δt`.
    fn expectation(&self, t: Time, x: Real, dt: Time) -> Real {
        x + self.drift(t, x) * dt
    }

    /// `σ(t, x)·√Δt`.
    fn std_deviation(&self, t: Time, x: Real, dt: Time) -> Real {
        self.diffusion(t, x) * dt.sqrt()
    }

    /// `σ(t, x)²·Δt`.
    fn variance(&self, t: Time, x: Real, dt: Time) -> Real {
        let s = self.diffusion(t, x);
        s * s * dt
    }

    /// One Euler–Maruyama step driven by the standard normal `dw`.
    fn evolve(&self, t: Time, x: Real, dt: Time, dw: Real) -> Real {
        self.expectation(t, x, dt) + self.std_deviation(t, x, dt) * dw
    }
}
