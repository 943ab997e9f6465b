//! Probability distributions.
//!
//! Provides the standard normal helpers (delegating to the `statrs` error
//! function) and the non-central chi-square law used for exact square-root
//! variance transitions (sampled through `rand_distr`).

pub mod chi_square;
pub mod normal;

pub use chi_square::NonCentralChiSquare;
pub use normal::{normal_cdf, normal_cdf_inverse, normal_pdf};
