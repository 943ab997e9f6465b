//! # mc-processes
//!
//! Process definitions consumed by the Monte Carlo engine: the lognormal and
//! Heston models, their Euler coefficients, exact transition laws and
//! characteristic functions.
//!
//! * [`LognormalSpec`] — flat-parameter Black–Scholes dynamics
//! * [`HestonSpec`] — Heston dynamics with Euler and Broadie–Kaya steppers
//! * [`SquareRootProcess`] — the CIR variance factor
//! * [`ProcessSpec`] — closed sum over the supported models

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod black_scholes_process;
pub mod heston_process;
pub mod process_spec;
pub mod square_root_process;
pub mod stochastic_process;

pub use black_scholes_process::LognormalSpec;
pub use heston_process::{BroadieKayaStep, ConditionalLogSpot, HestonSpec, IntegratedVarianceCf};
pub use process_spec::ProcessSpec;
pub use square_root_process::{SquareRootProcess, SquareRootTransition};
pub use stochastic_process::Diffusion1D;
