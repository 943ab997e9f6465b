//! Sample paths: a read-only [`Path`] view and the [`PathSet`] arena that
//! backs an ensemble.
//!
//! A `PathSet` stores `trajectories × (steps + 1) × dimension` reals in one
//! flat buffer. Trajectory `i` owns the contiguous chunk
//! `[i·stride, (i+1)·stride)` with `stride = (steps + 1)·dimension`; within a
//! chunk observation `k` occupies `[k·dimension, (k+1)·dimension)` and the
//! first component is always the spot.

use mc_core::{Real, Time};

/// A single sample path: observation times plus the state at each time.
#[derive(Debug, Clone, Copy)]
pub struct Path<'a> {
    times: &'a [Time],
    states: &'a [Real],
    dimension: usize,
}

impl<'a> Path<'a> {
    pub(crate) fn new(times: &'a [Time], states: &'a [Real], dimension: usize) -> Self {
        debug_assert_eq!(times.len() * dimension, states.len());
        Self {
            times,
            states,
            dimension,
        }
    }

    /// Observation times, strictly increasing from the start of the span.
    pub fn times(&self) -> &'a [Time] {
        self.times
    }

    /// Number of observations (steps + 1).
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the path has no observations.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of time steps.
    pub fn steps(&self) -> usize {
        self.len().saturating_sub(1)
    }

    /// State components per observation (1 = spot, 2 = spot and variance).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Full state at observation `k`.
    pub fn state(&self, k: usize) -> &'a [Real] {
        &self.states[k * self.dimension..(k + 1) * self.dimension]
    }

    /// Spot at observation `k`.
    pub fn spot(&self, k: usize) -> Real {
        self.states[k * self.dimension]
    }

    /// Variance at observation `k`, for two-factor states.
    pub fn variance(&self, k: usize) -> Option<Real> {
        (self.dimension > 1).then(|| self.states[k * self.dimension + 1])
    }

    /// Spot at the first observation.
    pub fn front(&self) -> Real {
        self.spot(0)
    }

    /// Spot at the last observation.
    pub fn back(&self) -> Real {
        self.spot(self.steps())
    }

    /// Spots along the path.
    pub fn spots(&self) -> impl Iterator<Item = Real> + 'a {
        self.states.iter().step_by(self.dimension).copied()
    }
}

/// Pre-sized arena holding the states of many trajectories.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSet {
    trajectories: usize,
    points: usize,
    dimension: usize,
    data: Vec<Real>,
}

impl PathSet {
    /// A zero-filled arena.
    pub fn zeros(trajectories: usize, points: usize, dimension: usize) -> Self {
        Self {
            trajectories,
            points,
            dimension,
            data: vec![0.0; trajectories * points * dimension],
        }
    }

    /// Number of trajectories.
    pub fn len(&self) -> usize {
        self.trajectories
    }

    /// Whether the arena holds no trajectories.
    pub fn is_empty(&self) -> bool {
        self.trajectories == 0
    }

    /// Observations per trajectory.
    pub fn points(&self) -> usize {
        self.points
    }

    /// State components per observation.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Reals per trajectory.
    pub fn stride(&self) -> usize {
        self.points * self.dimension
    }

    /// Raw states of trajectory `i`.
    pub fn states(&self, i: usize) -> &[Real] {
        let stride = self.stride();
        &self.data[i * stride..(i + 1) * stride]
    }

    /// The whole arena, trajectory-major.
    pub fn as_slice(&self) -> &[Real] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Real] {
        &mut self.data
    }

    /// Spot of every trajectory at observation `k`.
    pub fn spots_at(&self, k: usize) -> impl Iterator<Item = Real> + '_ {
        let stride = self.stride();
        let offset = k * self.dimension;
        self.data.chunks_exact(stride).map(move |chunk| chunk[offset])
    }

    /// Terminal spot of every trajectory.
    pub fn terminal_spots(&self) -> impl Iterator<Item = Real> + '_ {
        self.spots_at(self.points - 1)
    }
}

/// An owned single path, as produced by
/// [`PathGenerator::generate`](super::path_generator::PathGenerator::generate).
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePath {
    /// Observation times.
    pub times: Vec<Time>,
    /// States, observation-major.
    pub states: Vec<Real>,
    /// State components per observation.
    pub dimension: usize,
    /// Characteristic-function draws that fell back to a low-confidence value.
    pub low_confidence_draws: usize,
}

impl SamplePath {
    /// Borrow as a [`Path`].
    pub fn as_path(&self) -> Path<'_> {
        Path::new(&self.times, &self.states, self.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_view_over_two_factor_states() {
        let times = [0.0, 0.5, 1.0];
        let states = [100.0, 0.04, 101.0, 0.05, 99.0, 0.03];
        let p = Path::new(&times, &states, 2);
        assert_eq!(p.len(), 3);
        assert_eq!(p.steps(), 2);
        assert_eq!(p.front(), 100.0);
        assert_eq!(p.back(), 99.0);
        assert_eq!(p.variance(1), Some(0.05));
        assert_eq!(p.state(2), &[99.0, 0.03]);
        assert_eq!(p.spots().collect::<Vec<_>>(), vec![100.0, 101.0, 99.0]);
    }

    #[test]
    fn one_factor_path_has_no_variance() {
        let times = [0.0, 1.0];
        let states = [100.0, 105.0];
        let p = Path::new(&times, &states, 1);
        assert_eq!(p.variance(0), None);
        assert_eq!(p.back(), 105.0);
    }

    #[test]
    fn arena_layout() {
        let mut set = PathSet::zeros(3, 2, 2);
        assert_eq!(set.stride(), 4);
        for (i, chunk) in set.as_mut_slice().chunks_mut(4).enumerate() {
            chunk.copy_from_slice(&[1.0, 0.1, i as Real, 0.2]);
        }
        assert_eq!(set.terminal_spots().collect::<Vec<_>>(), vec![0.0, 1.0, 2.0]);
        assert_eq!(set.spots_at(0).sum::<Real>(), 3.0);
        assert_eq!(set.states(1), &[1.0, 0.1, 1.0, 0.2]);
    }
}
