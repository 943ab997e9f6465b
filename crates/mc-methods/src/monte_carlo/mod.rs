//! Monte Carlo simulation framework.
//!
//! # Overview
//!
//! * [`SimulationConfig`] — trajectory count, grid, seeds and variance reduction
//! * [`DiscretizationStrategy`] — how a model is advanced between observations
//! * [`PathGenerator`] — one seeded path of one model
//! * [`simulate`] — the parallel ensemble engine, producing an [`Ensemble`]
//! * [`european_estimate`] / [`price_european`] — discounted terminal payoffs

mod config;
mod engine;
mod path;
mod path_generator;
mod pricing;
mod strategy;

pub use config::{SimulationConfig, VarianceReduction};
pub use engine::{simulate, Ensemble};
pub use path::{Path, PathSet, SamplePath};
pub use path_generator::PathGenerator;
pub use pricing::{
    european_estimate, price_european, Discount, FlatRate, McEstimate, OptionType, Payoff,
    PlainVanillaPayoff,
};
pub use strategy::DiscretizationStrategy;
