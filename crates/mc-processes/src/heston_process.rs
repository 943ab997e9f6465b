//! Heston stochastic volatility model.
//!
//! ```text
//! dS = r S dt + √v S dW₁
//! dv = κ(θ − v) dt + σ √v dW₂
//! dW₁ dW₂ = ρ dt
//! ```
//!
//! State vector: `[S, v]`.
//!
//! Two time-steppers are provided: a log-Euler / full-truncation scheme
//! ([`HestonSpec::euler_step`]) and the exact scheme of Broadie & Kaya (2006)
//! ([`HestonSpec::broadie_kaya_step`]), which samples the variance from its
//! non-central chi-square transition, the integrated variance from its
//! conditional characteristic function and the log-spot from its conditional
//! Gaussian law.

use crate::square_root_process::SquareRootProcess;
use crate::stochastic_process::Diffusion1D;
use mc_core::{ensure, errors::Result, Rate, Real, Time};
use mc_math::bessel::log_bessel_i_continued;
use mc_math::characteristic_function::{self, CfSample, Confidence, SamplerConfig};
use mc_math::{normal_cdf_inverse, PathRng};
use num_complex::Complex64;
use tracing::debug;

/// Parameters of the Heston model.
///
/// * `v0`         — initial variance
/// * `kappa`      — mean-reversion speed of variance
/// * `theta`      — long-run variance level
/// * `vol_of_vol` — volatility of variance `σ`
/// * `rho`        — correlation between the two Brownian motions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawHestonSpec")
)]
pub struct HestonSpec {
    spot: Real,
    rate: Rate,
    kappa: Real,
    theta: Real,
    vol_of_vol: Real,
    rho: Real,
    v0: Real,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawHestonSpec {
    spot: Real,
    rate: Rate,
    kappa: Real,
    theta: Real,
    vol_of_vol: Real,
    rho: Real,
    v0: Real,
}

#[cfg(feature = "serde")]
impl TryFrom<RawHestonSpec> for HestonSpec {
    type Error = mc_core::Error;

    fn try_from(raw: RawHestonSpec) -> Result<Self> {
        Self::new(raw.spot, raw.rate, raw.kappa, raw.theta, raw.vol_of_vol, raw.rho, raw.v0)
    }
}

/// The outcome of one exact Broadie–Kaya step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BroadieKayaStep {
    /// `S_{t+Δ}`.
    pub spot: Real,
    /// `V_{t+Δ}`.
    pub variance: Real,
    /// `∫_t^{t+Δ} V_s ds`.
    pub integrated_variance: Real,
    /// Confidence of the integrated-variance inversion.
    pub confidence: Confidence,
}

impl HestonSpec {
    /// Create the model.
    ///
    /// Requires `spot > 0`, `kappa > 0`, `theta > 0`, `vol_of_vol > 0`,
    /// `rho ∈ [−1, 1]` and `v0 ≥ 0`, all finite.
    pub fn new(
        spot: Real,
        rate: Rate,
        kappa: Real,
        theta: Real,
        vol_of_vol: Real,
        rho: Real,
        v0: Real,
    ) -> Result<Self> {
        ensure!(spot.is_finite() && spot > 0.0, "spot must be positive, got {spot}");
        ensure!(rate.is_finite(), "rate must be finite, got {rate}");
        ensure!(kappa.is_finite() && kappa > 0.0, "mean-reversion speed must be positive, got {kappa}");
        ensure!(theta.is_finite() && theta > 0.0, "long-run variance must be positive, got {theta}");
        ensure!(
            vol_of_vol.is_finite() && vol_of_vol > 0.0,
            "vol-of-vol must be positive, got {vol_of_vol}"
        );
        ensure!(
            (-1.0..=1.0).contains(&rho),
            "correlation must be in [-1, 1], got {rho}"
        );
        ensure!(v0.is_finite() && v0 >= 0.0, "initial variance must be non-negative, got {v0}");
        if 2.0 * kappa * theta < vol_of_vol * vol_of_vol {
            debug!(kappa, theta, vol_of_vol, "Feller condition violated; variance can reach zero");
        }
        Ok(Self {
            spot,
            rate,
            kappa,
            theta,
            vol_of_vol,
            rho,
            v0,
        })
    }

    /// Initial spot.
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// Risk-free rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// Mean-reversion speed.
    pub fn kappa(&self) -> Real {
        self.kappa
    }

    /// Long-run variance.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Vol-of-vol.
    pub fn vol_of_vol(&self) -> Real {
        self.vol_of_vol
    }

    /// Correlation.
    pub fn rho(&self) -> Real {
        self.rho
    }

    /// Initial variance.
    pub fn v0(&self) -> Real {
        self.v0
    }

    /// The variance factor as a square-root process.
    pub fn variance_process(&self) -> SquareRootProcess {
        SquareRootProcess::from_validated(self.kappa, self.theta, self.vol_of_vol, self.v0)
    }

    /// `E[∫₀ᵗ V_s ds] = θt + (v₀ − θ)(1 − e^{−κt})/κ`.
    pub fn expected_integrated_variance(&self, t: Time) -> Real {
        self.theta * t + (self.v0 - self.theta) * (1.0 - (-self.kappa * t).exp()) / self.kappa
    }

    // ── Euler ─────────────────────────────────────────────────────────────────

    /// One Euler step driven by independent standard normals `z1`, `z2`.
    ///
    /// The spot is advanced in log space; the variance uses full truncation
    /// (`v⁺` in drift and diffusion, result floored at zero).
    pub fn euler_step(&self, s: Real, v: Real, dt: Time, z1: Real, z2: Real) -> (Real, Real) {
        let v_plus = v.max(0.0);
        let sqrt_dt = dt.sqrt();
        let spot = s * ((self.rate - 0.5 * v_plus) * dt + v_plus.sqrt() * sqrt_dt * z1).exp();
        let dw_v = self.rho * z1 + (1.0 - self.rho * self.rho).sqrt() * z2;
        let variance = self.variance_process().evolve(0.0, v, dt, dw_v);
        (spot, variance)
    }

    // ── Broadie–Kaya ──────────────────────────────────────────────────────────

    /// Characteristic function of `∫_t^{t+Δ} V_s ds` given `V_t = v_start`
    /// and `V_{t+Δ} = v_end`.
    pub fn integrated_variance_cf(&self, v_start: Real, v_end: Real, dt: Time) -> IntegratedVarianceCf {
        IntegratedVarianceCf::new(self, v_start, v_end, dt)
    }

    /// Conditional law of `log S_{t+Δ}` given the variance endpoints and the
    /// integrated variance.
    pub fn conditional_log_spot(
        &self,
        log_spot: Real,
        v_start: Real,
        v_end: Real,
        integrated_variance: Real,
        dt: Time,
    ) -> ConditionalLogSpot {
        let mean = log_spot + self.rate * dt - 0.5 * integrated_variance
            + self.rho / self.vol_of_vol
                * (v_end - v_start - self.kappa * self.theta * dt + self.kappa * integrated_variance);
        let variance = ((1.0 - self.rho * self.rho) * integrated_variance).max(0.0);
        ConditionalLogSpot { mean, variance }
    }

    /// One exact step from `(s, v)` over `dt`.
    ///
    /// `z` is the standard normal driving the conditional log-spot draw; the
    /// variance and integrated variance consume `aux`. Given both, the log
    /// spot is Gaussian, so it is drawn from the closed-form quantile rather
    /// than by inverting [`ConditionalLogSpot::cf`].
    pub fn broadie_kaya_step(
        &self,
        s: Real,
        v: Real,
        dt: Time,
        z: Real,
        aux: &mut PathRng,
        sampler: &SamplerConfig,
    ) -> Result<BroadieKayaStep> {
        let v_end = self.variance_process().transition(v, dt)?.sample(aux);

        let cf = self.integrated_variance_cf(v, v_end, dt);
        let scale = cf.natural_scale();
        let draw: CfSample =
            characteristic_function::sample(aux, &|a: Real| cf.evaluate(a / scale), sampler);
        let integrated_variance = scale * draw.value;

        let log_spot = self.conditional_log_spot(s.ln(), v, v_end, integrated_variance, dt);
        Ok(BroadieKayaStep {
            spot: log_spot.draw(z).exp(),
            variance: v_end,
            integrated_variance,
            confidence: draw.confidence,
        })
    }

    // ── Log-spot characteristic function ─────────────────────────────────────

    /// Characteristic function of `log S_t` (the "little trap" form of
    /// Albrecher et al., which stays on the principal branch of the log).
    pub fn log_spot_cf(&self, t: Time, u: Real) -> Complex64 {
        let iu = Complex64::new(0.0, u);
        let sigma2 = self.vol_of_vol * self.vol_of_vol;
        let beta = self.kappa - self.rho * self.vol_of_vol * iu;
        let d = (beta * beta + sigma2 * (iu + u * u)).sqrt();
        let g = (beta - d) / (beta + d);
        let decay = (-d * t).exp();
        let one = Complex64::new(1.0, 0.0);

        let c = self.rate * iu * t
            + self.kappa * self.theta / sigma2
                * ((beta - d) * t - 2.0 * ((one - g * decay) / (one - g)).ln());
        let dd = (beta - d) / sigma2 * (one - decay) / (one - g * decay);
        (c + dd * self.v0 + iu * self.spot.ln()).exp()
    }
}

/// `Normal(mean, variance)` law of `log S_{t+Δ}` conditional on the variance
/// path summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionalLogSpot {
    /// Conditional mean.
    pub mean: Real,
    /// Conditional variance `(1 − ρ²)∫V`.
    pub variance: Real,
}

impl ConditionalLogSpot {
    /// `E[e^{iu log S}] = exp(iu·mean − variance·u²/2)`.
    pub fn cf(&self, u: Real) -> Complex64 {
        Complex64::new(-0.5 * self.variance * u * u, self.mean * u).exp()
    }

    /// Closed-form quantile at probability `p ∈ (0, 1)`.
    pub fn quantile(&self, p: Real) -> Real {
        self.draw(normal_cdf_inverse(p))
    }

    /// The log-spot corresponding to the standard normal `z`.
    pub fn draw(&self, z: Real) -> Real {
        self.mean + self.variance.sqrt() * z
    }
}

/// The Broadie–Kaya characteristic function of the integrated variance,
/// conditional on both variance endpoints:
///
/// ```text
/// Φ(a) = γ e^{−(γ−κ)Δ/2} (1 − e^{−κΔ}) / (κ (1 − e^{−γΔ}))
///      · exp{ (v_u + v_t)/σ² [ κ(1+e^{−κΔ})/(1−e^{−κΔ}) − γ(1+e^{−γΔ})/(1−e^{−γΔ}) ] }
///      · I_ν(z_γ) / I_ν(z_κ),
/// γ = √(κ² − 2σ²ia),   ν = 2κθ/σ² − 1,
/// z_x = √(v_u v_t) · 4x e^{−xΔ/2} / (σ²(1 − e^{−xΔ}))
/// ```
///
/// The `a`-independent `κ` terms are computed once. `ln z_γ` is built term
/// by term so its argument is continuous in `a`, and the Bessel ratio is
/// evaluated on that branch.
#[derive(Debug, Clone)]
pub struct IntegratedVarianceCf {
    kappa: Real,
    sigma2: Real,
    dt: Time,
    nu: Real,
    v_sum: Real,
    scale: Real,
    log_root: Option<Real>,
    log_shape_kappa: Real,
    coth_kappa: Real,
    log_bessel_kappa: Complex64,
}

impl IntegratedVarianceCf {
    fn new(spec: &HestonSpec, v_start: Real, v_end: Real, dt: Time) -> Self {
        let kappa = spec.kappa;
        let sigma2 = spec.vol_of_vol * spec.vol_of_vol;
        let nu = 2.0 * kappa * spec.theta / sigma2 - 1.0;
        let v_start = v_start.max(0.0);
        let v_end = v_end.max(0.0);

        let decay = (-kappa * dt).exp();
        let log_shape_kappa = kappa.ln() - 0.5 * kappa * dt - (1.0 - decay).ln();
        let coth_kappa = kappa * (1.0 + decay) / (1.0 - decay);

        let product = v_start * v_end;
        let log_root = (product > 0.0).then(|| (4.0 * product.sqrt() / sigma2).ln());
        let log_bessel_kappa = log_root
            .map(|lr| log_bessel_i_continued(nu, Complex64::new(lr + log_shape_kappa, 0.0)))
            .unwrap_or_default();

        // Order of magnitude of the integrated variance; sampling X/scale
        // keeps the finite-difference moments well conditioned.
        let scale = dt * (0.5 * (v_start + v_end) + 0.5 * kappa * spec.theta * dt);

        Self {
            kappa,
            sigma2,
            dt,
            nu,
            v_sum: v_start + v_end,
            scale,
            log_root,
            log_shape_kappa,
            coth_kappa,
            log_bessel_kappa,
        }
    }

    /// A positive scale of the same order as the integrated variance.
    pub fn natural_scale(&self) -> Real {
        self.scale
    }

    /// `Φ(a)`.
    pub fn evaluate(&self, a: Real) -> Complex64 {
        let one = Complex64::new(1.0, 0.0);
        let gamma = Complex64::new(self.kappa * self.kappa, -2.0 * self.sigma2 * a).sqrt();
        let decay = (-gamma * self.dt).exp();
        let log_shape_gamma = gamma.ln() - 0.5 * gamma * self.dt - (one - decay).ln();

        let mut log_phi = log_shape_gamma - self.log_shape_kappa;
        log_phi += self.v_sum / self.sigma2 * (self.coth_kappa - gamma * (one + decay) / (one - decay));
        log_phi += match self.log_root {
            Some(lr) => log_bessel_i_continued(self.nu, lr + log_shape_gamma) - self.log_bessel_kappa,
            // I_ν(z) ~ (z/2)^ν / Γ(ν+1) as z → 0
            None => self.nu * (log_shape_gamma - self.log_shape_kappa),
        };
        log_phi.exp()
    }
}
