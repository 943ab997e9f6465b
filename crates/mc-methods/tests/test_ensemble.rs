//! Ensemble-level properties: reproducibility and antithetic pairing.

use mc_methods::monte_carlo::{
    european_estimate, simulate, DiscretizationStrategy, Ensemble, FlatRate, PlainVanillaPayoff,
    SimulationConfig,
};
use mc_math::SamplerConfig;
use mc_processes::{HestonSpec, LognormalSpec, ProcessSpec};

fn lognormal() -> ProcessSpec {
    LognormalSpec::new(100.0, 0.05, 0.2).unwrap().into()
}

fn heston() -> ProcessSpec {
    HestonSpec::new(100.0, 0.03, 2.0, 0.04, 0.4, -0.6, 0.04).unwrap().into()
}

fn correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx) * (a - mx);
        syy += (b - my) * (b - my);
    }
    sxy / (sxx * syy).sqrt()
}

fn terminal_logs(e: &Ensemble) -> (Vec<f64>, Vec<f64>) {
    let primal = e.paths().terminal_spots().map(f64::ln).collect();
    let twins = e
        .antithetic_paths()
        .expect("antithetic ensemble")
        .terminal_spots()
        .map(f64::ln)
        .collect();
    (primal, twins)
}

// ───────────────────────── Determinism ─────────────────────────

#[test]
fn identical_inputs_give_identical_ensembles() {
    let cases = [
        (lognormal(), DiscretizationStrategy::ExactLognormal),
        (lognormal(), DiscretizationStrategy::EulerMaruyama { steps: 12 }),
        (heston(), DiscretizationStrategy::EulerMaruyama { steps: 12 }),
        (heston(), DiscretizationStrategy::ExactHestonBroadieKaya { steps: 2 }),
    ];
    for (spec, strategy) in cases {
        let config = SimulationConfig::with_master_seed(40, 4, 77).unwrap().antithetic();
        let a = simulate(&config, &spec, &strategy, (0.0, 1.0)).unwrap();
        let b = simulate(&config, &spec, &strategy, (0.0, 1.0)).unwrap();
        assert_eq!(a, b, "{strategy}");

        let other = SimulationConfig::with_master_seed(40, 4, 78).unwrap().antithetic();
        let c = simulate(&other, &spec, &strategy, (0.0, 1.0)).unwrap();
        assert_ne!(a.paths(), c.paths(), "{strategy}");
    }
}

#[test]
fn thread_count_does_not_change_paths() {
    let config = SimulationConfig::with_master_seed(256, 8, 3).unwrap().antithetic();
    let strategy = DiscretizationStrategy::EulerMaruyama { steps: 8 };
    let parallel = simulate(&config, &heston(), &strategy, (0.0, 1.0)).unwrap();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let serial = pool.install(|| simulate(&config, &heston(), &strategy, (0.0, 1.0)).unwrap());
    assert_eq!(parallel, serial);
}

#[test]
fn explicit_seeds_are_used_verbatim() {
    let seeds = vec![5, 5, 9];
    let config = SimulationConfig::with_seeds(3, seeds).unwrap();
    let e = simulate(&config, &lognormal(), &DiscretizationStrategy::ExactLognormal, (0.0, 1.0)).unwrap();
    assert_eq!(e.paths().states(0), e.paths().states(1));
    assert_ne!(e.paths().states(0), e.paths().states(2));
}

#[test]
fn low_confidence_draws_are_counted_not_fatal() {
    // A bisection bracket ending at the mean cannot contain roots above the
    // median, so roughly half the integrated-variance draws fall back.
    let sampler = SamplerConfig {
        fallback_sigma: 0.0,
        newton_max_evals: 0,
        ..SamplerConfig::default()
    };
    let config = SimulationConfig::with_master_seed(32, 1, 14).unwrap().with_sampler(sampler);
    let e = simulate(
        &config,
        &heston(),
        &DiscretizationStrategy::ExactHestonBroadieKaya { steps: 2 },
        (0.0, 1.0),
    )
    .unwrap();
    assert!(e.low_confidence_draws() > 0);
    assert!(e.low_confidence_draws() <= 2 * e.len());
    assert!(e.all_paths().all(|p| p.spots().all(|s| s.is_finite() && s > 0.0)));

    let default = SimulationConfig::with_master_seed(32, 1, 14).unwrap();
    let clean = simulate(
        &default,
        &heston(),
        &DiscretizationStrategy::ExactHestonBroadieKaya { steps: 2 },
        (0.0, 1.0),
    )
    .unwrap();
    assert!(clean.low_confidence_draws() < e.low_confidence_draws());
}

// ───────────────────────── Antithetic pairing ─────────────────────────

#[test]
fn lognormal_twins_are_perfectly_anticorrelated() {
    let config = SimulationConfig::with_master_seed(2_000, 1, 11).unwrap().antithetic();
    let e = simulate(&config, &lognormal(), &DiscretizationStrategy::ExactLognormal, (0.0, 1.0)).unwrap();
    let (x, y) = terminal_logs(&e);
    assert!(correlation(&x, &y) < -0.999_999);

    let spots: Vec<f64> = e.paths().terminal_spots().collect();
    let twins: Vec<f64> = e.antithetic_paths().unwrap().terminal_spots().collect();
    assert!(correlation(&spots, &twins) < -0.9);

    // S·S̃ = S0² e^{(2r − σ²)T}; without the convexity term it is S0² e^{2rT}.
    let exact = 1e4 * (2.0 * 0.05 - 0.04_f64).exp();
    let loose = 1e4 * (2.0 * 0.05_f64).exp();
    for (s, t) in spots.iter().zip(&twins) {
        assert!((s * t / exact - 1.0).abs() < 1e-10);
        assert!((s * t / loose - 1.0).abs() < 0.05);
    }
}

#[test]
fn heston_twins_are_anticorrelated() {
    let config = SimulationConfig::with_master_seed(2_000, 1, 12).unwrap().antithetic();
    let e = simulate(
        &config,
        &heston(),
        &DiscretizationStrategy::EulerMaruyama { steps: 20 },
        (0.0, 1.0),
    )
    .unwrap();
    let (x, y) = terminal_logs(&e);
    assert!(correlation(&x, &y) < -0.5, "correlation {}", correlation(&x, &y));
}

#[test]
fn broadie_kaya_twins_share_variance_draws() {
    let config = SimulationConfig::with_master_seed(16, 1, 13).unwrap().antithetic();
    let e = simulate(
        &config,
        &heston(),
        &DiscretizationStrategy::ExactHestonBroadieKaya { steps: 2 },
        (0.0, 1.0),
    )
    .unwrap();
    for i in 0..e.len() {
        let (p, a) = (e.path(i), e.antithetic_path(i).unwrap());
        assert_eq!(p.variance(1), a.variance(1));
        assert_eq!(p.variance(2), a.variance(2));
        assert_ne!(p.back(), a.back());
    }
}

#[test]
fn antithetic_pairs_reduce_the_standard_error() {
    let call = PlainVanillaPayoff::call(100.0);
    let rate = FlatRate::new(0.05);
    let strategy = DiscretizationStrategy::ExactLognormal;

    let plain = SimulationConfig::with_master_seed(10_000, 1, 21).unwrap();
    let paired = SimulationConfig::with_master_seed(5_000, 1, 21).unwrap().antithetic();
    let plain = european_estimate(&simulate(&plain, &lognormal(), &strategy, (0.0, 1.0)).unwrap(), &call, &rate)
        .unwrap();
    let paired = european_estimate(&simulate(&paired, &lognormal(), &strategy, (0.0, 1.0)).unwrap(), &call, &rate)
        .unwrap();

    assert_eq!(paired.samples, 5_000);
    assert!(
        paired.std_error < plain.std_error,
        "antithetic {} vs plain {}",
        paired.std_error,
        plain.std_error
    );
}
