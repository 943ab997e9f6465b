//! # mc-methods
//!
//! Monte Carlo pricing over simulated path ensembles.
//!
//! # Modules
//!
//! * [`monte_carlo`] — path simulation, the ensemble engine with antithetic
//!   variates, and the European estimator
//! * [`lsm`] — Longstaff–Schwartz backward induction for early exercise

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Least-squares Monte Carlo for American-style claims.
pub mod lsm;

/// Monte Carlo simulation: configuration, paths, ensembles, European pricing.
pub mod monte_carlo;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use lsm::{price_american_lsm, ExerciseDiagnostics, LsmResult, StoppingRecord};
pub use monte_carlo::{
    european_estimate, price_european, simulate, Discount, DiscretizationStrategy, Ensemble,
    FlatRate, McEstimate, OptionType, Path, PathGenerator, PathSet, Payoff, PlainVanillaPayoff,
    SamplePath, SimulationConfig, VarianceReduction,
};
