//! Seeded dice RNG.
//!
//! All dice in a game are rolled from one `GameRng`, so a game replays
//! identically from its seed and the players' responses.
//!
//! ```
//! use ashes_rules::core::GameRng;
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! assert_eq!(a.roll_d6(), b.roll_d6());
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Roll a six-sided die, returning a face in `1..=6`.
    pub fn roll_d6(&mut self) -> u8 {
        self.inner.gen_range(1..=6)
    }
}
