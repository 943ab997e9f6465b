//! Single-path simulation.
//!
//! A [`PathGenerator`] binds a model, a strategy and a time span. Each call
//! builds the path's own Mersenne-Twister stream from the trajectory seed;
//! non-Gaussian randomness (Heston variance and integrated-variance draws)
//! comes from an auxiliary sub-stream of the same seed. Identical inputs give
//! bit-identical paths regardless of thread scheduling.

use super::path::SamplePath;
use super::strategy::{DiscretizationStrategy, Scheme};
use mc_core::{ensure_config, errors::Result, Real, Time};
use mc_math::characteristic_function::{Confidence, SamplerConfig};
use mc_math::random_numbers::AUXILIARY_STREAM;
use mc_math::PathRng;
use mc_processes::ProcessSpec;

/// Where a path's Gaussian increments come from.
#[derive(Debug)]
pub(crate) enum Noise<'a> {
    /// Fresh draws from the path stream.
    Fresh,
    /// Fresh draws, copied into the buffer as they are consumed.
    Record(&'a mut [Real]),
    /// The negation of a previously recorded trace.
    Replay(&'a [Real]),
}

struct NoiseSource<'a> {
    rng: PathRng,
    noise: Noise<'a>,
    cursor: usize,
}

impl<'a> NoiseSource<'a> {
    fn new(seed: u64, noise: Noise<'a>) -> Self {
        Self {
            rng: PathRng::new(seed),
            noise,
            cursor: 0,
        }
    }

    fn next(&mut self) -> Real {
        let z = match &mut self.noise {
            Noise::Fresh => self.rng.next_gaussian(),
            Noise::Record(trace) => {
                let z = self.rng.next_gaussian();
                trace[self.cursor] = z;
                z
            }
            Noise::Replay(trace) => -trace[self.cursor],
        };
        self.cursor += 1;
        z
    }
}

/// Simulates single paths of one model under one strategy.
#[derive(Debug, Clone)]
pub struct PathGenerator {
    spec: ProcessSpec,
    strategy: DiscretizationStrategy,
    scheme: Scheme,
    times: Vec<Time>,
    dt: Time,
    sampler: SamplerConfig,
}

impl PathGenerator {
    /// Bind `spec` and `strategy` to the span `tspan`.
    ///
    /// `default_steps` sets the grid when the strategy carries no step count.
    pub fn new(
        spec: &ProcessSpec,
        strategy: &DiscretizationStrategy,
        tspan: (Time, Time),
        default_steps: usize,
        sampler: SamplerConfig,
    ) -> Result<Self> {
        let scheme = Scheme::resolve(spec, strategy)?;
        let (t0, t1) = tspan;
        ensure_config!(
            t0.is_finite() && t1.is_finite() && t1 > t0,
            "time span must be increasing, got ({t0}, {t1})"
        );
        let steps = strategy.observation_steps(default_steps);
        ensure_config!(steps >= 1, "at least one observation step is required");

        let dt = (t1 - t0) / steps as Real;
        let mut times: Vec<Time> = (0..=steps).map(|k| t0 + k as Real * dt).collect();
        times[steps] = t1;

        Ok(Self {
            spec: *spec,
            strategy: *strategy,
            scheme,
            times,
            dt,
            sampler,
        })
    }

    /// Observation times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Number of observation intervals.
    pub fn steps(&self) -> usize {
        self.times.len() - 1
    }

    /// State components per observation.
    pub fn dimension(&self) -> usize {
        self.spec.dimension()
    }

    /// Gaussian increments consumed by one path.
    pub fn gaussians_per_path(&self) -> usize {
        self.steps() * self.scheme.gaussians_per_step()
    }

    /// Simulate the path for `seed`.
    pub fn generate(&self, seed: u64) -> Result<SamplePath> {
        let dimension = self.dimension();
        let mut states = vec![0.0; self.times.len() * dimension];
        let low_confidence_draws = self.generate_into(seed, &mut states, Noise::Fresh)?;
        Ok(SamplePath {
            times: self.times.clone(),
            states,
            dimension,
            low_confidence_draws,
        })
    }

    /// A generator for the volatility-mirrored model, when the model mirrors
    /// through its parameters.
    pub(crate) fn mirrored(&self) -> Result<Option<Self>> {
        let Some(spec) = self.spec.mirrored() else {
            return Ok(None);
        };
        let scheme = Scheme::resolve(&spec, &self.strategy)?;
        Ok(Some(Self {
            spec,
            scheme,
            ..self.clone()
        }))
    }

    /// Write the path for `seed` into `out` (length `(steps + 1)·dimension`)
    /// and return the number of low-confidence sampler draws.
    pub(crate) fn generate_into(&self, seed: u64, out: &mut [Real], noise: Noise<'_>) -> Result<usize> {
        let dt = self.dt;
        let mut gaussians = NoiseSource::new(seed, noise);
        let mut low_confidence = 0;
        self.spec.initial_state(&mut out[..self.dimension()]);

        match self.scheme {
            Scheme::LognormalExact(l) => {
                for k in 1..self.times.len() {
                    out[k] = l.exact_step(out[k - 1], dt, gaussians.next());
                }
            }
            Scheme::LognormalEuler(l) => {
                for k in 1..self.times.len() {
                    out[k] = l.euler_step(out[k - 1], dt, gaussians.next());
                }
            }
            Scheme::HestonEuler(h) => {
                let (mut s, mut v) = (out[0], out[1]);
                for state in out.chunks_exact_mut(2).skip(1) {
                    let z1 = gaussians.next();
                    let z2 = gaussians.next();
                    (s, v) = h.euler_step(s, v, dt, z1, z2);
                    state[0] = s;
                    state[1] = v;
                }
            }
            Scheme::HestonBroadieKaya(h) => {
                let mut aux = PathRng::substream(seed, AUXILIARY_STREAM);
                let (mut s, mut v) = (out[0], out[1]);
                for state in out.chunks_exact_mut(2).skip(1) {
                    let z = gaussians.next();
                    let step = h.broadie_kaya_step(s, v, dt, z, &mut aux, &self.sampler)?;
                    if step.confidence == Confidence::LowConfidence {
                        low_confidence += 1;
                    }
                    s = step.spot;
                    v = step.variance;
                    state[0] = s;
                    state[1] = v;
                }
            }
        }
        Ok(low_confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mc_processes::{HestonSpec, LognormalSpec};

    fn lognormal() -> ProcessSpec {
        LognormalSpec::new(100.0, 0.05, 0.2).unwrap().into()
    }

    fn heston() -> ProcessSpec {
        HestonSpec::new(100.0, 0.05, 1.5, 0.04, 0.3, -0.5, 0.04).unwrap().into()
    }

    fn generator(spec: &ProcessSpec, strategy: DiscretizationStrategy) -> PathGenerator {
        PathGenerator::new(spec, &strategy, (0.0, 1.0), 4, SamplerConfig::default()).unwrap()
    }

    #[test]
    fn grid_spans_the_interval() {
        let g = PathGenerator::new(
            &lognormal(),
            &DiscretizationStrategy::EulerMaruyama { steps: 3 },
            (0.5, 2.0),
            10,
            SamplerConfig::default(),
        )
        .unwrap();
        assert_eq!(g.times().len(), 4);
        assert_eq!(g.times()[0], 0.5);
        assert_eq!(g.times()[3], 2.0);
        assert!(g.times().windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn rejects_bad_span() {
        let strategy = DiscretizationStrategy::ExactLognormal;
        assert!(PathGenerator::new(&lognormal(), &strategy, (1.0, 1.0), 4, SamplerConfig::default()).is_err());
        assert!(PathGenerator::new(&lognormal(), &strategy, (0.0, f64::NAN), 4, SamplerConfig::default()).is_err());
    }

    #[test]
    fn same_seed_same_path() {
        for (spec, strategy) in [
            (lognormal(), DiscretizationStrategy::ExactLognormal),
            (lognormal(), DiscretizationStrategy::EulerMaruyama { steps: 8 }),
            (heston(), DiscretizationStrategy::EulerMaruyama { steps: 8 }),
            (heston(), DiscretizationStrategy::ExactHestonBroadieKaya { steps: 2 }),
        ] {
            let g = generator(&spec, strategy);
            let a = g.generate(42).unwrap();
            let b = g.generate(42).unwrap();
            assert_eq!(a, b);
            assert_eq!(a.states[0], 100.0);
            assert_ne!(a, g.generate(43).unwrap());
        }
    }

    #[test]
    fn heston_paths_keep_nonnegative_variance() {
        let g = generator(&heston(), DiscretizationStrategy::EulerMaruyama { steps: 50 });
        for seed in 0..50 {
            let path = g.generate(seed).unwrap();
            let view = path.as_path();
            assert_eq!(view.variance(0), Some(0.04));
            assert!((0..view.len()).all(|k| view.variance(k).unwrap() >= 0.0));
        }
    }

    #[test]
    fn replayed_noise_is_negated() {
        let g = generator(&heston(), DiscretizationStrategy::EulerMaruyama { steps: 5 });
        let mut trace = vec![0.0; g.gaussians_per_path()];
        let mut primal = vec![0.0; 12];
        let mut twin = vec![0.0; 12];
        g.generate_into(9, &mut primal, Noise::Record(&mut trace)).unwrap();
        g.generate_into(9, &mut twin, Noise::Replay(&trace)).unwrap();
        assert_eq!(primal, g.generate(9).unwrap().states);

        let h = match heston() {
            ProcessSpec::Heston(h) => h,
            ProcessSpec::Lognormal(_) => unreachable!(),
        };
        let (s_up, _) = h.euler_step(100.0, 0.04, 0.2, trace[0], trace[1]);
        let (s_down, _) = h.euler_step(100.0, 0.04, 0.2, -trace[0], -trace[1]);
        assert_relative_eq!(primal[2], s_up, max_relative = 1e-14);
        assert_relative_eq!(twin[2], s_down, max_relative = 1e-14);
    }

    #[test]
    fn mirrored_lognormal_generator() {
        let g = generator(&lognormal(), DiscretizationStrategy::ExactLognormal);
        let m = g.mirrored().unwrap().unwrap();
        let up = g.generate(3).unwrap();
        let down = m.generate(3).unwrap();
        let product = up.states[4] * down.states[4];
        assert_relative_eq!(product, 1e4 * (2.0 * 0.03_f64).exp(), max_relative = 1e-12);
        assert!(generator(&heston(), DiscretizationStrategy::EulerMaruyama { steps: 2 })
            .mirrored()
            .unwrap()
            .is_none());
    }
}
