//! Discretization strategies and their resolution against a model.

use mc_core::{errors::Error, errors::Result};
use mc_processes::{HestonSpec, LognormalSpec, ProcessSpec};
use std::fmt;

/// How a path is advanced between observation dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiscretizationStrategy {
    /// `steps` Euler–Maruyama increments, each one an observation.
    EulerMaruyama {
        /// Number of increments.
        steps: usize,
    },
    /// One exact lognormal draw per observation interval.
    ExactLognormal,
    /// One exact Broadie–Kaya Heston draw per observation interval.
    ExactHestonBroadieKaya {
        /// Number of observation intervals.
        steps: usize,
    },
}

impl DiscretizationStrategy {
    /// The step count the strategy carries, if any.
    pub fn steps(&self) -> Option<usize> {
        match self {
            Self::EulerMaruyama { steps } | Self::ExactHestonBroadieKaya { steps } => Some(*steps),
            Self::ExactLognormal => None,
        }
    }

    /// Number of observation intervals, falling back to `default_steps`.
    pub fn observation_steps(&self, default_steps: usize) -> usize {
        self.steps().unwrap_or(default_steps)
    }

    /// Check the strategy can drive `spec`.
    pub fn validate(&self, spec: &ProcessSpec) -> Result<()> {
        Scheme::resolve(spec, self).map(|_| ())
    }
}

impl fmt::Display for DiscretizationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EulerMaruyama { steps } => write!(f, "euler-maruyama({steps})"),
            Self::ExactLognormal => write!(f, "exact-lognormal"),
            Self::ExactHestonBroadieKaya { steps } => write!(f, "broadie-kaya({steps})"),
        }
    }
}

/// A (model, strategy) pair that is known to be compatible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Scheme {
    LognormalExact(LognormalSpec),
    LognormalEuler(LognormalSpec),
    HestonEuler(HestonSpec),
    HestonBroadieKaya(HestonSpec),
}

impl Scheme {
    pub(crate) fn resolve(spec: &ProcessSpec, strategy: &DiscretizationStrategy) -> Result<Self> {
        if strategy.steps() == Some(0) {
            return Err(Error::InvalidConfiguration(format!(
                "{strategy} needs at least one step"
            )));
        }
        match (spec, strategy) {
            (ProcessSpec::Lognormal(l), DiscretizationStrategy::ExactLognormal) => {
                Ok(Self::LognormalExact(*l))
            }
            (ProcessSpec::Lognormal(l), DiscretizationStrategy::EulerMaruyama { .. }) => {
                Ok(Self::LognormalEuler(*l))
            }
            (ProcessSpec::Heston(h), DiscretizationStrategy::EulerMaruyama { .. }) => {
                Ok(Self::HestonEuler(*h))
            }
            (ProcessSpec::Heston(h), DiscretizationStrategy::ExactHestonBroadieKaya { .. }) => {
                Ok(Self::HestonBroadieKaya(*h))
            }
            (spec, strategy) => Err(Error::InvalidConfiguration(format!(
                "{strategy} cannot simulate a {} model",
                match spec {
                    ProcessSpec::Lognormal(_) => "lognormal",
                    ProcessSpec::Heston(_) => "Heston",
                }
            ))),
        }
    }

    /// Standard normals consumed per observation interval.
    pub(crate) fn gaussians_per_step(&self) -> usize {
        match self {
            Self::HestonEuler(_) => 2,
            _ => 1,
        }
    }
}
