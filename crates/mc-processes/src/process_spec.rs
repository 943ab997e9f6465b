//! `ProcessSpec`: the closed set of models the simulator understands.

use crate::black_scholes_process::LognormalSpec;
use crate::heston_process::HestonSpec;
use mc_core::{Real, Time};
use num_complex::Complex64;

/// A stochastic model of the underlying, immutable once built.
///
/// The state is the spot for [`ProcessSpec::Lognormal`] and the pair
/// `(spot, variance)` for [`ProcessSpec::Heston`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProcessSpec {
    /// Black–Scholes dynamics.
    Lognormal(LognormalSpec),
    /// Heston stochastic volatility.
    Heston(HestonSpec),
}

impl From<LognormalSpec> for ProcessSpec {
    fn from(spec: LognormalSpec) -> Self {
        Self::Lognormal(spec)
    }
}

impl From<HestonSpec> for ProcessSpec {
    fn from(spec: HestonSpec) -> Self {
        Self::Heston(spec)
    }
}

impl ProcessSpec {
    /// Number of state components per observation.
    pub fn dimension(&self) -> usize {
        match self {
            Self::Lognormal(_) => 1,
            Self::Heston(_) => 2,
        }
    }

    /// State at `t = 0`, written into `out` (length [`dimension`](Self::dimension)).
    pub fn initial_state(&self, out: &mut [Real]) {
        match self {
            Self::Lognormal(l) => out[0] = l.spot(),
            Self::Heston(h) => {
                out[0] = h.spot();
                out[1] = h.v0();
            }
        }
    }

    /// Initial spot.
    pub fn spot(&self) -> Real {
        match self {
            Self::Lognormal(l) => l.spot(),
            Self::Heston(h) => h.spot(),
        }
    }

    /// Risk-free rate.
    pub fn rate(&self) -> Real {
        match self {
            Self::Lognormal(l) => l.rate(),
            Self::Heston(h) => h.rate(),
        }
    }

    /// The volatility-mirrored model used for antithetic pairing.
    ///
    /// Only the lognormal model mirrors through its parameters; Heston
    /// antithetics replay negated noise instead, so `None` is returned.
    pub fn mirrored(&self) -> Option<ProcessSpec> {
        match self {
            Self::Lognormal(l) => Some(Self::Lognormal(l.mirrored())),
            Self::Heston(_) => None,
        }
    }

    /// Characteristic function of `log S_t`.
    pub fn characteristic_function(&self, t: Time) -> impl Fn(Real) -> Complex64 + '_ {
        move |u| match self {
            Self::Lognormal(l) => l.log_spot_cf(t, u),
            Self::Heston(h) => h.log_spot_cf(t, u),
        }
    }
}
