//! 1D root-finding solvers.
//!
//! Both solvers report an explicit [`RootOutcome`] instead of an error: a
//! Monte Carlo draw always needs *a* number, and the caller decides how to
//! treat a low-confidence root.

use mc_core::Real;

/// Result of a 1-D root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootOutcome {
    /// `|f(x)|` fell below the requested tolerance.
    Converged(Real),
    /// Best available estimate; the tolerance was not met or the search was
    /// abandoned (non-bracketing interval, exhausted evaluation budget).
    LowConfidence(Real),
}

impl RootOutcome {
    /// The root estimate regardless of confidence.
    pub fn value(self) -> Real {
        match self {
            RootOutcome::Converged(x) | RootOutcome::LowConfidence(x) => x,
        }
    }

    /// Whether the tolerance was met.
    pub fn is_converged(self) -> bool {
        matches!(self, RootOutcome::Converged(_))
    }
}

// ── Secant ────────────────────────────────────────────────────────────────────

/// Damped secant iteration (order 2) from the starting pair `(x0, x1)`.
///
/// Iterates stay at or above `lower`: a step that would cross it is replaced
/// by the midpoint between the current iterate and `lower`. At most
/// `max_evals` evaluations of `f` are spent.
pub fn secant<F>(f: F, x0: Real, x1: Real, lower: Real, atol: Real, max_evals: usize) -> RootOutcome
where
    F: Fn(Real) -> Real,
{
    if max_evals == 0 {
        return RootOutcome::LowConfidence(x0);
    }
    let mut xa = x0;
    let mut fa = f(xa);
    let mut evals = 1;
    if fa.abs() < atol {
        return RootOutcome::Converged(xa);
    }
    let mut xb = x1.max(lower);
    while evals < max_evals {
        let fb = f(xb);
        evals += 1;
        if !fb.is_finite() {
            return RootOutcome::LowConfidence(xa);
        }
        if fb.abs() < atol {
            return RootOutcome::Converged(xb);
        }
        let denom = fb - fa;
        if denom == 0.0 {
            return RootOutcome::LowConfidence(xb);
        }
        let mut next = xb - fb * (xb - xa) / denom;
        if !next.is_finite() {
            return RootOutcome::LowConfidence(xb);
        }
        if next < lower {
            next = 0.5 * (xb + lower);
        }
        xa = xb;
        fa = fb;
        xb = next;
    }
    RootOutcome::LowConfidence(xb)
}

// ── Bisection ────────────────────────────────────────────────────────────────

/// Bisection on `[x_min, x_max]` with at most `max_evals` evaluations.
///
/// When the endpoints do not bracket a root the upper bound is returned as a
/// [`RootOutcome::LowConfidence`] value.
pub fn bisection<F>(f: F, x_min: Real, x_max: Real, atol: Real, max_evals: usize) -> RootOutcome
where
    F: Fn(Real) -> Real,
{
    if max_evals < 2 {
        return RootOutcome::LowConfidence(x_max);
    }
    let mut a = x_min;
    let mut b = x_max;
    let fa = f(a);
    let fb = f(b);
    let mut evals = 2;

    if fa.abs() < atol {
        return RootOutcome::Converged(a);
    }
    if fb.abs() < atol {
        return RootOutcome::Converged(b);
    }
    if fa * fb > 0.0 || !(fa * fb).is_finite() {
        return RootOutcome::LowConfidence(x_max);
    }

    let mut fa = fa;
    let mut mid = 0.5 * (a + b);
    while evals < max_evals {
        mid = 0.5 * (a + b);
        let fm = f(mid);
        evals += 1;
        if fm.abs() < atol || mid == a || mid == b {
            return RootOutcome::Converged(mid);
        }
        if fm * fa > 0.0 {
            a = mid;
            fa = fm;
        } else {
            b = mid;
        }
    }
    RootOutcome::LowConfidence(mid)
}
