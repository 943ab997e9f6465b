//! Per-path pseudo-random streams.
//!
//! Every trajectory owns its own generator, constructed from a per-trajectory
//! seed and passed explicitly into the simulation code. There is no shared
//! default stream, so paths are reproducible under any scheduling order.

use crate::distributions::normal_cdf_inverse;
use mc_core::Real;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_mt::Mt19937GenRand64;

/// Stream identifier for the auxiliary (non-Gaussian) stream of a path.
pub const AUXILIARY_STREAM: u64 = 1;

/// A seeded Mersenne Twister (MT19937-64) stream owned by one path.
///
/// Implements [`RngCore`] so `rand_distr` laws can draw from it directly.
pub struct PathRng {
    rng: Mt19937GenRand64,
}

impl PathRng {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mt19937GenRand64::new(seed),
        }
    }

    /// Create the generator for an independent sub-stream of `seed`.
    ///
    /// Sub-stream `0` is the stream returned by [`PathRng::new`].
    pub fn substream(seed: u64, stream: u64) -> Self {
        if stream == 0 {
            Self::new(seed)
        } else {
            Self::new(split_seed(seed, stream))
        }
    }

    /// Uniform deviate in `[0, 1)`.
    pub fn next_uniform(&mut self) -> Real {
        (self.rng.next_u64() >> 11) as Real * (1.0 / (1u64 << 53) as Real)
    }

    /// Uniform deviate in the open interval `(0, 1)`.
    pub fn next_open_uniform(&mut self) -> Real {
        ((self.rng.next_u64() >> 11) as Real + 0.5) * (1.0 / (1u64 << 53) as Real)
    }

    /// Standard-normal deviate by inversion of an open uniform.
    ///
    /// Inversion (rather than a rejection method) keeps the number of
    /// uniforms per normal fixed at one, so recorded noise traces line up
    /// one-to-one with the stream.
    pub fn next_gaussian(&mut self) -> Real {
        normal_cdf_inverse(self.next_open_uniform())
    }
}

impl RngCore for PathRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.fill_bytes(dest);
        Ok(())
    }
}

impl std::fmt::Debug for PathRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathRng").finish_non_exhaustive()
    }
}

/// Derive a decorrelated seed for sub-stream `stream` of `seed`
/// (SplitMix64 finaliser).
pub fn split_seed(seed: u64, stream: u64) -> u64 {
    let mut z = seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Generate `n` per-trajectory seeds from a master seed.
pub fn generate_seeds(master_seed: u64, n: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(master_seed);
    (0..n).map(|_| rng.gen()).collect()
}

/// Generate `n` per-trajectory seeds from operating-system entropy.
pub fn generate_entropy_seeds(n: usize) -> Vec<u64> {
    generate_seeds(rand::thread_rng().gen(), n)
}
