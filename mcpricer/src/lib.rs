//! # mcpricer
//!
//! Monte Carlo pricing of European and American-style claims under the
//! lognormal and Heston models.
//!
//! This crate is a **façade** that re-exports the public items of the
//! workspace crates. Application code should depend on this crate rather
//! than the individual `mc-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use mcpricer::methods::{
//!     price_european, simulate, DiscretizationStrategy, FlatRate, PlainVanillaPayoff,
//!     SimulationConfig,
//! };
//! use mcpricer::processes::{LognormalSpec, ProcessSpec};
//!
//! let spec: ProcessSpec = LognormalSpec::new(100.0, 0.05, 0.2).unwrap().into();
//! let config = SimulationConfig::with_master_seed(2_000, 1, 7).unwrap().antithetic();
//! let ensemble = simulate(&config, &spec, &DiscretizationStrategy::ExactLognormal, (0.0, 1.0)).unwrap();
//! let price = price_european(&ensemble, &PlainVanillaPayoff::call(100.0), &FlatRate::new(0.05)).unwrap();
//! assert!((price - 10.45).abs() < 1.0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use mc_core as core;

/// Mathematical utilities: distributions, RNG streams, regression, Fourier sampling.
pub use mc_math as math;

/// Model definitions: lognormal and Heston.
pub use mc_processes as processes;

/// Path simulation, ensembles, European and LSM pricing.
pub use mc_methods as methods;

pub use mc_core::{Error, Real, Result, Time};
pub use mc_methods::{
    european_estimate, price_american_lsm, price_european, simulate, DiscretizationStrategy,
    Ensemble, FlatRate, LsmResult, McEstimate, OptionType, PlainVanillaPayoff, SimulationConfig,
    VarianceReduction,
};
pub use mc_processes::{HestonSpec, LognormalSpec, ProcessSpec};
