//! Simulation configuration: ensemble size, grid size, seeds and the
//! variance-reduction policy.

use mc_core::{ensure_config, errors::Result};
use mc_math::characteristic_function::SamplerConfig;
use mc_math::random_numbers::{generate_entropy_seeds, generate_seeds};
use std::fmt;

/// Variance-reduction policy of an ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarianceReduction {
    /// Independent trajectories only.
    #[default]
    None,
    /// Every trajectory is paired with a mirrored twin.
    Antithetic,
}

impl fmt::Display for VarianceReduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarianceReduction::None => write!(f, "none"),
            VarianceReduction::Antithetic => write!(f, "antithetic"),
        }
    }
}

/// A fully reproducible simulation request.
///
/// Seeds are drawn once, when the configuration is built, and stored; running
/// the same configuration twice yields bit-identical ensembles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawSimulationConfig")
)]
pub struct SimulationConfig {
    trajectories: usize,
    steps: usize,
    seeds: Vec<u64>,
    variance_reduction: VarianceReduction,
    sampler: SamplerConfig,
}

/// Unvalidated wire form; deserialization goes through
/// [`SimulationConfig::from_parts`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawSimulationConfig {
    trajectories: usize,
    steps: usize,
    seeds: Vec<u64>,
    variance_reduction: VarianceReduction,
    sampler: SamplerConfig,
}

#[cfg(feature = "serde")]
impl TryFrom<RawSimulationConfig> for SimulationConfig {
    type Error = mc_core::Error;

    fn try_from(raw: RawSimulationConfig) -> Result<Self> {
        Self::from_parts(raw.trajectories, raw.steps, raw.seeds, raw.variance_reduction)
            .map(|config| config.with_sampler(raw.sampler))
    }
}

impl SimulationConfig {
    /// `trajectories` paths of `steps` intervals, seeded from OS entropy.
    pub fn new(trajectories: usize, steps: usize) -> Result<Self> {
        ensure_config!(trajectories >= 1, "trajectories must be at least 1, got {trajectories}");
        Self::with_seeds(steps, generate_entropy_seeds(trajectories))
    }

    /// `trajectories` paths of `steps` intervals, seeded from `master_seed`.
    pub fn with_master_seed(trajectories: usize, steps: usize, master_seed: u64) -> Result<Self> {
        ensure_config!(trajectories >= 1, "trajectories must be at least 1, got {trajectories}");
        Self::with_seeds(steps, generate_seeds(master_seed, trajectories))
    }

    /// One trajectory per supplied seed.
    pub fn with_seeds(steps: usize, seeds: Vec<u64>) -> Result<Self> {
        Self::from_parts(seeds.len(), steps, seeds, VarianceReduction::None)
    }

    /// Build from explicit parts; `seeds.len()` must equal `trajectories`.
    pub fn from_parts(
        trajectories: usize,
        steps: usize,
        seeds: Vec<u64>,
        variance_reduction: VarianceReduction,
    ) -> Result<Self> {
        ensure_config!(trajectories >= 1, "trajectories must be at least 1, got {trajectories}");
        ensure_config!(steps >= 1, "steps must be at least 1, got {steps}");
        ensure_config!(
            seeds.len() == trajectories,
            "expected {trajectories} seeds, got {}",
            seeds.len()
        );
        Ok(Self {
            trajectories,
            steps,
            seeds,
            variance_reduction,
            sampler: SamplerConfig::default(),
        })
    }

    /// Enable antithetic pairing.
    pub fn antithetic(self) -> Self {
        self.with_variance_reduction(VarianceReduction::Antithetic)
    }

    /// Set the variance-reduction policy.
    pub fn with_variance_reduction(mut self, variance_reduction: VarianceReduction) -> Self {
        self.variance_reduction = variance_reduction;
        self
    }

    /// Set the tuning of the characteristic-function sampler.
    pub fn with_sampler(mut self, sampler: SamplerConfig) -> Self {
        self.sampler = sampler;
        self
    }

    /// Number of (primal) trajectories.
    pub fn trajectories(&self) -> usize {
        self.trajectories
    }

    /// Default number of observation intervals.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Per-trajectory seeds.
    pub fn seeds(&self) -> &[u64] {
        &self.seeds
    }

    /// Variance-reduction policy.
    pub fn variance_reduction(&self) -> VarianceReduction {
        self.variance_reduction
    }

    /// Characteristic-function sampler tuning.
    pub fn sampler(&self) -> &SamplerConfig {
        &self.sampler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::Error;

    #[test]
    fn master_seed_is_reproducible() {
        let a = SimulationConfig::with_master_seed(16, 4, 7).unwrap();
        let b = SimulationConfig::with_master_seed(16, 4, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seeds().len(), 16);
        assert_eq!(a.variance_reduction(), VarianceReduction::None);
    }

    #[test]
    fn entropy_seeds_are_stored() {
        let a = SimulationConfig::new(8, 2).unwrap();
        let b = a.clone();
        assert_eq!(a.seeds(), b.seeds());
    }

    #[test]
    fn rejects_degenerate_sizes() {
        assert!(matches!(SimulationConfig::new(0, 10), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(
            SimulationConfig::with_master_seed(10, 0, 1),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            SimulationConfig::from_parts(3, 1, vec![1, 2], VarianceReduction::None),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn antithetic_switch() {
        let c = SimulationConfig::with_master_seed(4, 1, 0).unwrap().antithetic();
        assert_eq!(c.variance_reduction(), VarianceReduction::Antithetic);
        assert_eq!(c.variance_reduction().to_string(), "antithetic");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialization_is_validated() {
        let config = SimulationConfig::with_master_seed(3, 1, 1).unwrap().antithetic();
        let json = serde_json::to_value(&config).unwrap();
        let back: SimulationConfig = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, config);

        let mut short = json.clone();
        short["seeds"] = serde_json::json!([7]);
        assert!(serde_json::from_value::<SimulationConfig>(short).is_err());

        let mut empty = json;
        empty["steps"] = serde_json::json!(0);
        assert!(serde_json::from_value::<SimulationConfig>(empty).is_err());
    }
}
