//! Error types for mcpricer.
//!
//! One `thiserror`-derived enum covers every fatal condition the pricing core
//! can report. Numerical non-convergence is deliberately absent: root-finding
//! degrades to a tagged fallback value instead of failing (see
//! `mc_math::solvers1d::RootOutcome`).

use thiserror::Error;

/// The top-level error type used throughout mcpricer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated (e.g. a non-finite price).
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A simulation or model configuration was rejected at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Shorthand `Result` type used throughout mcpricer.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use mc_core::{ensure, errors::Error};
/// fn positive(x: f64) -> mc_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use mc_core::ensure_post;
/// fn finite_price(x: f64) -> mc_core::errors::Result<f64> {
///     ensure_post!(x.is_finite(), "price must be finite, got {x}");
///     Ok(x)
/// }
/// assert!(finite_price(1.0).is_ok());
/// assert!(finite_price(f64::NAN).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::InvalidConfiguration(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use mc_core::{ensure_config, errors::Error};
/// fn trajectories(n: usize) -> mc_core::errors::Result<usize> {
///     ensure_config!(n >= 1, "trajectories must be at least 1, got {n}");
///     Ok(n)
/// }
/// assert!(matches!(trajectories(0), Err(Error::InvalidConfiguration(_))));
/// ```
#[macro_export]
macro_rules! ensure_config {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidConfiguration(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use mc_core::fail;
/// fn always_err() -> mc_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
