//! Deterministic RNG for schedule sampling.
//!
//! Lives in the simulator, not the engine; the engine has no randomness.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG for simulation middleware.
pub struct SimRng {
    inner: ChaCha8Rng,
}

impl SimRng {
    /// Create a new RNG from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Derive a child RNG from the current stream.
    ///
    /// This isolates components (e.g., independent walk runs) so their
    /// random draws don't affect each other.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        let seed = self.inner.next_u64();
        Self::new(seed)
    }

    /// Sample a uniform index in `[0, len)`.
    ///
    /// `len` must be nonzero.
    pub fn pick_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }
}
