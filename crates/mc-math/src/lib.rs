//! # mc-math
//!
//! Mathematical utilities for Monte Carlo pricing: normal and non-central
//! chi-square distributions (via statrs / rand_distr), seeded per-path random
//! streams (over rand_mt), a statistics accumulator, 1-D root finding with an
//! explicit confidence outcome, polynomial least-squares regression (over
//! nalgebra), the complex modified Bessel function, and exact sampling from
//! a characteristic function.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Modified Bessel function of the first kind for complex arguments.
pub mod bessel;

/// Exact sampling of a non-negative variable from its characteristic function.
pub mod characteristic_function;

/// Probability distributions.
pub mod distributions;

/// Polynomial least-squares regression.
pub mod linear_least_squares;

/// Per-path pseudo-random streams and seed generation.
pub mod random_numbers;

/// 1D root-finding solvers.
pub mod solvers1d;

/// Statistics accumulators.
pub mod statistics;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use characteristic_function::{
    CfSample, CharacteristicFunction, Confidence, FourierSeries, SamplerConfig,
};
pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf, NonCentralChiSquare};
pub use linear_least_squares::PolynomialRegression;
pub use num_complex::Complex64;
pub use random_numbers::{generate_seeds, PathRng};
pub use solvers1d::RootOutcome;
pub use statistics::Statistics;
