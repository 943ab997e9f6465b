//! Least-squares Monte Carlo (Longstaff–Schwartz) for early-exercise claims.
//!
//! The solver walks the observation dates of an [`Ensemble`] backwards. Every
//! path carries a stopping record, initially `(maturity, payoff(S_T))`. At
//! each interior date the in-the-money paths regress their discounted future
//! stopping payoff on a polynomial in the spot; a path whose immediate payoff
//! strictly beats the fitted continuation value stops there instead.
//!
//! Antithetic twins are treated as independent paths: each one gets its own
//! exercise decision. The regression is in-sample, so the estimate carries
//! the usual small upward bias of the method.

use crate::monte_carlo::{Discount, Ensemble, Payoff};
use mc_core::{ensure, ensure_post, errors::Result, DiscountFactor, Real, Time};
use mc_math::{PolynomialRegression, Statistics};
use rayon::prelude::*;
use tracing::{debug, trace};

/// When and at what value one path stops.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoppingRecord {
    /// Observation time of exercise (maturity if never exercised early).
    pub time: Time,
    /// Payoff received at `time`.
    pub payoff: Real,
}

/// What happened at one exercise date.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExerciseDiagnostics {
    /// Observation time.
    pub time: Time,
    /// Paths in the money, i.e. used for the regression.
    pub itm_paths: usize,
    /// Paths whose stopping record moved to this date.
    pub exercised_paths: usize,
}

/// Output of [`price_american_lsm`].
#[derive(Debug, Clone, PartialEq)]
pub struct LsmResult {
    /// Mean discounted stopping payoff.
    pub price: Real,
    /// Standard error of the mean over all paths.
    pub std_error: Real,
    /// Per-path stopping records, primal paths first, then twins.
    pub stopping: Vec<StoppingRecord>,
    /// Interior exercise dates in chronological order.
    pub exercise_dates: Vec<ExerciseDiagnostics>,
}

/// Price an American-style claim on `ensemble` by backward induction.
///
/// Exercise is possible at every observation after the first. `degree` is
/// the polynomial degree of the continuation regression; it is lowered to
/// `itm − 1` at dates with fewer than `degree + 1` in-the-money paths.
pub fn price_american_lsm<P, D>(
    ensemble: &Ensemble,
    payoff: &P,
    discount: &D,
    degree: usize,
) -> Result<LsmResult>
where
    P: Payoff + ?Sized,
    D: Discount + ?Sized,
{
    ensure!(!ensemble.is_empty(), "cannot price an empty ensemble");
    let times = ensemble.times();
    let t0 = times[0];
    let steps = ensemble.steps();
    let maturity = times[steps];

    let factor = |t: Time| -> Result<DiscountFactor> {
        let df = discount.discount(t - t0);
        ensure!(df.is_finite() && df > 0.0, "discount factor at {t} must be positive, got {df}");
        Ok(df)
    };

    let paths: Vec<_> = ensemble.all_paths().collect();
    let mut stopping: Vec<StoppingRecord> = paths
        .par_iter()
        .map(|p| StoppingRecord {
            time: maturity,
            payoff: payoff.value(p.back()),
        })
        .collect();

    let mut exercise_dates = Vec::with_capacity(steps.saturating_sub(1));
    for k in (1..steps).rev() {
        let t = times[k];
        let df_t = factor(t)?;
        let immediate: Vec<Real> = paths.par_iter().map(|p| payoff.value(p.spot(k))).collect();
        let itm: Vec<usize> = (0..paths.len()).filter(|&i| immediate[i] > 0.0).collect();

        if itm.is_empty() {
            trace!(time = t, "no paths in the money");
            exercise_dates.push(ExerciseDiagnostics {
                time: t,
                itm_paths: 0,
                exercised_paths: 0,
            });
            continue;
        }

        let spots: Vec<Real> = itm.iter().map(|&i| paths[i].spot(k)).collect();
        let mut continuation = Vec::with_capacity(itm.len());
        for &i in &itm {
            let record = stopping[i];
            continuation.push(record.payoff * factor(record.time)? / df_t);
        }

        let fit_degree = degree.min(itm.len() - 1);
        let regression = PolynomialRegression::fit(&spots, &continuation, fit_degree)?;

        let mut exercised = 0;
        for (&i, &s) in itm.iter().zip(&spots) {
            if immediate[i] > regression.predict(s) {
                stopping[i] = StoppingRecord {
                    time: t,
                    payoff: immediate[i],
                };
                exercised += 1;
            }
        }
        trace!(time = t, itm_paths = itm.len(), exercised, degree = fit_degree, "exercise date");
        exercise_dates.push(ExerciseDiagnostics {
            time: t,
            itm_paths: itm.len(),
            exercised_paths: exercised,
        });
    }
    exercise_dates.reverse();

    let values = stopping
        .iter()
        .map(|r| Ok(r.payoff * factor(r.time)?))
        .collect::<Result<Vec<Real>>>()?;
    let stats = Statistics::from_samples(&values);
    let price = stats.mean().unwrap_or(0.0);
    let std_error = stats.error_estimate().unwrap_or(0.0);
    ensure_post!(price.is_finite(), "LSM price is not finite: {price}");
    debug!(paths = paths.len(), price, std_error, "LSM backward pass complete");

    Ok(LsmResult {
        price,
        std_error,
        stopping,
        exercise_dates,
    })
}
