//! The ensemble engine: many seeded trajectories simulated in parallel, with
//! optional antithetic twins.
//!
//! Each trajectory writes only its own chunk of a pre-sized [`PathSet`]
//! arena, so the rayon tasks share nothing mutable. Antithetic twins are
//! produced in one of two ways:
//!
//! * models that mirror through their parameters (lognormal) rerun the same
//!   seeds with the volatility negated;
//! * otherwise (Heston) the primal run records its Gaussian increments into a
//!   noise arena and the twin replays them negated, drawing its non-Gaussian
//!   randomness from the same auxiliary streams.

use super::config::{SimulationConfig, VarianceReduction};
use super::path::{Path, PathSet};
use super::path_generator::{Noise, PathGenerator};
use super::strategy::DiscretizationStrategy;
use mc_core::{errors::Result, Real, Time};
use mc_processes::ProcessSpec;
use rayon::prelude::*;
use tracing::debug;

/// The simulated paths of one configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    times: Vec<Time>,
    paths: PathSet,
    antithetic_paths: Option<PathSet>,
    low_confidence_draws: usize,
}

impl Ensemble {
    /// Observation times shared by every path.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Number of primal trajectories.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the ensemble holds no trajectories.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// State components per observation.
    pub fn dimension(&self) -> usize {
        self.paths.dimension()
    }

    /// Number of observation intervals.
    pub fn steps(&self) -> usize {
        self.times.len() - 1
    }

    /// Primal trajectories.
    pub fn paths(&self) -> &PathSet {
        &self.paths
    }

    /// Antithetic twins; `antithetic_paths[i]` mirrors `paths[i]`.
    pub fn antithetic_paths(&self) -> Option<&PathSet> {
        self.antithetic_paths.as_ref()
    }

    /// Whether the ensemble carries antithetic twins.
    pub fn is_antithetic(&self) -> bool {
        self.antithetic_paths.is_some()
    }

    /// Characteristic-function draws (over all paths) that fell back to a
    /// low-confidence value.
    pub fn low_confidence_draws(&self) -> usize {
        self.low_confidence_draws
    }

    /// Primal trajectory `i`.
    pub fn path(&self, i: usize) -> Path<'_> {
        Path::new(&self.times, self.paths.states(i), self.dimension())
    }

    /// Antithetic twin of trajectory `i`.
    pub fn antithetic_path(&self, i: usize) -> Option<Path<'_>> {
        self.antithetic_paths
            .as_ref()
            .map(|set| Path::new(&self.times, set.states(i), set.dimension()))
    }

    /// Every path: the primal trajectories followed by their twins.
    pub fn all_paths(&self) -> impl Iterator<Item = Path<'_>> + '_ {
        let twins = self.antithetic_paths.iter().flat_map(move |set| {
            (0..set.len()).map(move |i| Path::new(&self.times, set.states(i), set.dimension()))
        });
        (0..self.len()).map(move |i| self.path(i)).chain(twins)
    }
}

/// Simulate `config.trajectories()` paths of `spec` under `strategy` over
/// `tspan`.
///
/// Incompatible model/strategy pairs, empty grids and non-increasing spans
/// are rejected with [`Error::InvalidConfiguration`](mc_core::Error).
pub fn simulate(
    config: &SimulationConfig,
    spec: &ProcessSpec,
    strategy: &DiscretizationStrategy,
    tspan: (Time, Time),
) -> Result<Ensemble> {
    let generator = PathGenerator::new(spec, strategy, tspan, config.steps(), *config.sampler())?;
    let antithetic = config.variance_reduction() == VarianceReduction::Antithetic;
    debug!(
        trajectories = config.trajectories(),
        steps = generator.steps(),
        %strategy,
        antithetic,
        "simulating ensemble"
    );

    let seeds = config.seeds();
    let points = generator.times().len();
    let dimension = generator.dimension();
    let mut paths = PathSet::zeros(seeds.len(), points, dimension);

    let mirror = if antithetic { generator.mirrored()? } else { None };
    let (antithetic_paths, low_confidence_draws) = match (antithetic, mirror) {
        (false, _) => {
            let low = fill(&generator, seeds, &mut paths)?;
            (None, low)
        }
        (true, Some(mirror)) => {
            let mut twins = PathSet::zeros(seeds.len(), points, dimension);
            let low = fill(&generator, seeds, &mut paths)? + fill(&mirror, seeds, &mut twins)?;
            (Some(twins), low)
        }
        (true, None) => {
            let width = generator.gaussians_per_path();
            let mut noise = vec![0.0; seeds.len() * width];
            let mut twins = PathSet::zeros(seeds.len(), points, dimension);
            let low = fill_recording(&generator, seeds, &mut paths, &mut noise, width)?
                + fill_replaying(&generator, seeds, &mut twins, &noise, width)?;
            (Some(twins), low)
        }
    };

    debug!(
        trajectories = seeds.len(),
        low_confidence_draws, "ensemble complete"
    );

    Ok(Ensemble {
        times: generator.times().to_vec(),
        paths,
        antithetic_paths,
        low_confidence_draws,
    })
}

fn fill(generator: &PathGenerator, seeds: &[u64], set: &mut PathSet) -> Result<usize> {
    let stride = set.stride();
    set.as_mut_slice()
        .par_chunks_mut(stride)
        .zip(seeds.par_iter())
        .map(|(out, &seed)| generator.generate_into(seed, out, Noise::Fresh))
        .try_reduce(|| 0, |a, b| Ok(a + b))
}

fn fill_recording(
    generator: &PathGenerator,
    seeds: &[u64],
    set: &mut PathSet,
    noise: &mut [Real],
    width: usize,
) -> Result<usize> {
    let stride = set.stride();
    set.as_mut_slice()
        .par_chunks_mut(stride)
        .zip(noise.par_chunks_mut(width))
        .zip(seeds.par_iter())
        .map(|((out, trace), &seed)| generator.generate_into(seed, out, Noise::Record(trace)))
        .try_reduce(|| 0, |a, b| Ok(a + b))
}

fn fill_replaying(
    generator: &PathGenerator,
    seeds: &[u64],
    set: &mut PathSet,
    noise: &[Real],
    width: usize,
) -> Result<usize> {
    let stride = set.stride();
    set.as_mut_slice()
        .par_chunks_mut(stride)
        .zip(noise.par_chunks(width))
        .zip(seeds.par_iter())
        .map(|((out, trace), &seed)| generator.generate_into(seed, out, Noise::Replay(trace)))
        .try_reduce(|| 0, |a, b| Ok(a + b))
}
