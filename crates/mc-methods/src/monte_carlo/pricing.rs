//! Payoff and discounting collaborators, and the European estimator.

use super::engine::Ensemble;
use mc_core::{ensure, ensure_post, errors::Result, DiscountFactor, Rate, Real, Time};
use mc_math::Statistics;
use rayon::prelude::*;
use std::fmt;

// ─── Collaborators ────────────────────────────────────────────────────────────

/// Exercise value as a function of the spot.
///
/// Implemented for every `Fn(Real) -> Real + Send + Sync`.
pub trait Payoff: Send + Sync {
    /// Payoff at spot `s`.
    fn value(&self, s: Real) -> Real;
}

impl<F> Payoff for F
where
    F: Fn(Real) -> Real + Send + Sync,
{
    fn value(&self, s: Real) -> Real {
        self(s)
    }
}

/// Discount factor as a function of time since the start of the simulation.
///
/// Implemented for every `Fn(Time) -> DiscountFactor + Send + Sync`.
pub trait Discount: Send + Sync {
    /// Discount factor in `(0, 1]` for time `t`.
    fn discount(&self, t: Time) -> DiscountFactor;
}

impl<F> Discount for F
where
    F: Fn(Time) -> DiscountFactor + Send + Sync,
{
    fn discount(&self, t: Time) -> DiscountFactor {
        self(t)
    }
}

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionType {
    /// Right to buy.
    Call,
    /// Right to sell.
    Put,
}

impl OptionType {
    /// +1 for Call, −1 for Put.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// `max(φ(S − K), 0)` with `φ = +1` for a call and `−1` for a put.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlainVanillaPayoff {
    /// Option type.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: Real,
}

impl PlainVanillaPayoff {
    /// Create a vanilla payoff.
    pub fn new(option_type: OptionType, strike: Real) -> Self {
        Self {
            option_type,
            strike,
        }
    }

    /// A call struck at `strike`.
    pub fn call(strike: Real) -> Self {
        Self::new(OptionType::Call, strike)
    }

    /// A put struck at `strike`.
    pub fn put(strike: Real) -> Self {
        Self::new(OptionType::Put, strike)
    }
}

impl Payoff for PlainVanillaPayoff {
    fn value(&self, s: Real) -> Real {
        (self.option_type.sign() * (s - self.strike)).max(0.0)
    }
}

impl fmt::Display for PlainVanillaPayoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vanilla {} @ {}", self.option_type, self.strike)
    }
}

/// Continuously compounded flat rate, `D(t) = e^{−rt}`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatRate {
    /// The rate `r`.
    pub rate: Rate,
}

impl FlatRate {
    /// Create a flat curve.
    pub fn new(rate: Rate) -> Self {
        Self { rate }
    }
}

impl Discount for FlatRate {
    fn discount(&self, t: Time) -> DiscountFactor {
        (-self.rate * t).exp()
    }
}

// ─── European estimator ──────────────────────────────────────────────────────

/// A Monte Carlo price with its standard error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McEstimate {
    /// Discounted mean payoff.
    pub price: Real,
    /// Standard error of the mean.
    pub std_error: Real,
    /// Number of independent samples averaged (antithetic pairs count once).
    pub samples: usize,
}

/// Price a European claim paying `payoff(S_T)` at the last observation.
///
/// With antithetic twins each trajectory contributes
/// `(payoff(path_i) + payoff(twin_i)) / 2`.
pub fn european_estimate<P, D>(ensemble: &Ensemble, payoff: &P, discount: &D) -> Result<McEstimate>
where
    P: Payoff + ?Sized,
    D: Discount + ?Sized,
{
    ensure!(!ensemble.is_empty(), "cannot price an empty ensemble");
    let times = ensemble.times();
    let maturity = times[times.len() - 1] - times[0];
    let df = discount.discount(maturity);
    ensure!(df.is_finite() && df > 0.0, "discount factor must be positive, got {df}");

    let primal: Vec<Real> = ensemble.paths().terminal_spots().collect();
    let values: Vec<Real> = match ensemble.antithetic_paths() {
        Some(twins) => {
            let mirrored: Vec<Real> = twins.terminal_spots().collect();
            primal
                .par_iter()
                .zip(mirrored.par_iter())
                .map(|(&s, &t)| 0.5 * (payoff.value(s) + payoff.value(t)))
                .collect()
        }
        None => primal.par_iter().map(|&s| payoff.value(s)).collect(),
    };

    let stats = Statistics::from_samples(&values);
    let price = df * stats.mean().unwrap_or(0.0);
    let std_error = df * stats.error_estimate().unwrap_or(0.0);
    ensure_post!(price.is_finite(), "European price is not finite: {price}");
    Ok(McEstimate {
        price,
        std_error,
        samples: values.len(),
    })
}

/// [`european_estimate`] without the error estimate.
pub fn price_european<P, D>(ensemble: &Ensemble, payoff: &P, discount: &D) -> Result<Real>
where
    P: Payoff + ?Sized,
    D: Discount + ?Sized,
{
    european_estimate(ensemble, payoff, discount).map(|e| e.price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monte_carlo::{simulate, DiscretizationStrategy, SimulationConfig};
    use approx::assert_relative_eq;
    use mc_processes::{LognormalSpec, ProcessSpec};

    #[test]
    fn vanilla_payoffs() {
        let call = PlainVanillaPayoff::call(100.0);
        let put = PlainVanillaPayoff::put(100.0);
        assert_eq!(call.value(110.0), 10.0);
        assert_eq!(call.value(90.0), 0.0);
        assert_eq!(put.value(90.0), 10.0);
        assert_eq!(put.value(110.0), 0.0);
        assert_eq!(call.to_string(), "Vanilla Call @ 100");
    }

    #[test]
    fn closures_are_collaborators() {
        let digital = |s: Real| if s > 100.0 { 1.0 } else { 0.0 };
        let df = |t: Time| (-0.1 * t).exp();
        assert_eq!(digital.value(101.0), 1.0);
        assert_relative_eq!(df.discount(2.0), FlatRate::new(0.1).discount(2.0));
    }

    #[test]
    fn zero_volatility_prices_the_forward_intrinsic() {
        let spec: ProcessSpec = LognormalSpec::new(100.0, 0.05, 0.0).unwrap().into();
        let config = SimulationConfig::with_master_seed(32, 3, 2).unwrap();
        let e = simulate(&config, &spec, &DiscretizationStrategy::ExactLognormal, (0.0, 1.0)).unwrap();
        let est = european_estimate(&e, &PlainVanillaPayoff::call(90.0), &FlatRate::new(0.05)).unwrap();
        let expected = (-0.05_f64).exp() * (100.0 * 0.05_f64.exp() - 90.0);
        assert_relative_eq!(est.price, expected, max_relative = 1e-12);
        assert!(est.std_error < 1e-4);
        assert_eq!(est.samples, 32);
    }

    #[test]
    fn maturity_is_measured_from_span_start() {
        let spec: ProcessSpec = LognormalSpec::new(100.0, 0.05, 0.0).unwrap().into();
        let config = SimulationConfig::with_master_seed(4, 2, 2).unwrap();
        let shifted = simulate(&config, &spec, &DiscretizationStrategy::ExactLognormal, (3.0, 4.0)).unwrap();
        let base = simulate(&config, &spec, &DiscretizationStrategy::ExactLognormal, (0.0, 1.0)).unwrap();
        let call = PlainVanillaPayoff::call(100.0);
        let rate = FlatRate::new(0.05);
        assert_relative_eq!(
            price_european(&shifted, &call, &rate).unwrap(),
            price_european(&base, &call, &rate).unwrap(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn non_finite_price_is_a_postcondition_failure() {
        let spec: ProcessSpec = LognormalSpec::new(100.0, 0.05, 0.2).unwrap().into();
        let config = SimulationConfig::with_master_seed(4, 1, 2).unwrap();
        let e = simulate(&config, &spec, &DiscretizationStrategy::ExactLognormal, (0.0, 1.0)).unwrap();
        let bad = |_s: Real| Real::NAN;
        assert!(matches!(
            price_european(&e, &bad, &FlatRate::new(0.05)),
            Err(mc_core::Error::Postcondition(_))
        ));
    }

    proptest::proptest! {
        #[test]
        fn call_minus_put_is_the_forward_payoff(s in 0.0..500.0_f64, k in 0.0..500.0_f64) {
            let diff = PlainVanillaPayoff::call(k).value(s) - PlainVanillaPayoff::put(k).value(s);
            proptest::prop_assert!((diff - (s - k)).abs() < 1e-12);
        }
    }
}
