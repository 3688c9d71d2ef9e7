//! Injectable random source for scheduling decisions
//!
//! Every random choice the explorer makes goes through [`RandomSource`], so a
//! seeded [`PcgSource`] replays a run exactly and tests can script the draws.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Uniform integer in the closed range `[0, span]`.
    fn span(&mut self, span: u64) -> u64;

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }
}

/// PCG-backed random source (deterministic when seeded)
pub struct PcgSource {
    rng: Pcg64,
    seed: u64,
}

impl PcgSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random::<u64>())
    }

    /// The seed this source started from (for reproducing a run).
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for PcgSource {
    fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn span(&mut self, span: u64) -> u64 {
        self.rng.random_range(0..=span)
    }
}
