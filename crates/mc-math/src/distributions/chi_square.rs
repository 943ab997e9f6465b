//! Non-central chi-square distribution.
//!
//! The transition law of a square-root (CIR) process over a finite interval
//! is a scaled non-central chi-square. Draws use the Poisson mixture
//! representation
//!
//! ```text
//! χ'²(d, λ) = χ²(d + 2N),   N ~ Poisson(λ / 2)
//! ```
//!
//! so only `rand_distr` central laws are needed.

use mc_core::{ensure, errors::Result, Real};
use rand::Rng;
use rand_distr::{ChiSquared, Distribution, Poisson};

/// Non-central chi-square distribution with `df` degrees of freedom and
/// non-centrality `λ`.
#[derive(Debug, Clone)]
pub struct NonCentralChiSquare {
    df: Real,
    noncentrality: Real,
    poisson: Option<Poisson<Real>>,
}

impl NonCentralChiSquare {
    /// Create the distribution.
    ///
    /// Requires `df > 0` and `noncentrality ≥ 0`, both finite.
    pub fn new(df: Real, noncentrality: Real) -> Result<Self> {
        ensure!(
            df.is_finite() && df > 0.0,
            "degrees of freedom must be positive, got {df}"
        );
        ensure!(
            noncentrality.is_finite() && noncentrality >= 0.0,
            "non-centrality must be non-negative, got {noncentrality}"
        );
        let poisson = if noncentrality > 0.0 {
            Some(Poisson::new(0.5 * noncentrality).map_err(|e| {
                mc_core::Error::InvalidArgument(format!("poisson mixing law: {e}"))
            })?)
        } else {
            None
        };
        Ok(Self {
            df,
            noncentrality,
            poisson,
        })
    }

    /// Degrees of freedom.
    pub fn df(&self) -> Real {
        self.df
    }

    /// Non-centrality parameter.
    pub fn noncentrality(&self) -> Real {
        self.noncentrality
    }

    /// Mean `d + λ`.
    pub fn mean(&self) -> Real {
        self.df + self.noncentrality
    }

    /// Variance `2(d + 2λ)`.
    pub fn variance(&self) -> Real {
        2.0 * (self.df + 2.0 * self.noncentrality)
    }

    /// Draw one sample.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Real {
        let mixing = match &self.poisson {
            Some(p) => p.sample(rng),
            None => 0.0,
        };
        let k = self.df + 2.0 * mixing;
        match ChiSquared::new(k) {
            Ok(central) => central.sample(rng),
            // k ≥ df > 0 by construction
            Err(_) => k,
        }
    }
}
