// Seedable randomness for mock scores

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of bounded random scores.
///
/// Built from a seed, two sources produce identical sequences, which lets
/// tests assert exact generator output.
pub struct ScoreSource {
    rng: StdRng,
}

impl ScoreSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is given, entropy otherwise
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Uniform integer in `lo..=hi`
    pub fn range(&mut self, lo: u8, hi: u8) -> u8 {
        if lo >= hi {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform jitter in `0..=max`
    pub fn jitter(&mut self, max: u8) -> u8 {
        self.range(0, max)
    }

    /// Uniform index below `len`; `len` must be non-zero
    pub fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}
