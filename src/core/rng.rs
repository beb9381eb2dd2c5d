//! Deterministic randomness for library shuffles.
//!
//! The only random operations in the rules core are shuffles (opening
//! libraries, "then shuffle" after a search). They all draw from one
//! seeded ChaCha8 stream owned by the game, so a game replayed from the
//! same seed and action sequence reaches the same state.
//!
//! ```
//! use ccg_rules::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::new(7);
//! let mut left = vec![1, 2, 3, 4, 5];
//! let mut right = left.clone();
//! a.shuffle(&mut left);
//! b.shuffle(&mut right);
//! assert_eq!(left, right);
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded RNG that serializes as its [`GameRngState`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(into = "GameRngState", from = "GameRngState")]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Shuffle a persistent vector (a zone) in place.
    pub fn shuffle_zone<T: Clone>(&mut self, zone: &mut im::Vector<T>) {
        let mut items: Vec<T> = zone.iter().cloned().collect();
        self.shuffle(&mut items);
        *zone = items.into_iter().collect();
    }

    /// Capture the current position of the stream.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore a stream captured with [`GameRng::state`].
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG position: seed plus ChaCha8 word position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    pub seed: u64,
    pub word_pos: u128,
}

impl From<GameRng> for GameRngState {
    fn from(rng: GameRng) -> Self {
        rng.state()
    }
}

impl From<GameRngState> for GameRng {
    fn from(state: GameRngState) -> Self {
        GameRng::from_state(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_different_seeds_shuffle_differently() {
        let mut a = GameRng::new(1);
        let mut b = GameRng::new(2);
        let mut left: Vec<u32> = (0..20).collect();
        let mut right = left.clone();
        a.shuffle(&mut left);
        b.shuffle(&mut right);
        assert_ne!(left, right);
    }

    #[test]
    fn test_state_restore_continues_stream() {
        let mut rng = GameRng::new(42);
        let mut warmup: Vec<u32> = (0..10).collect();
        rng.shuffle(&mut warmup);

        let mut restored = GameRng::from_state(&rng.state());
        let mut left: Vec<u32> = (0..10).collect();
        let mut right = left.clone();
        rng.shuffle(&mut left);
        restored.shuffle(&mut right);
        assert_eq!(left, right);
    }

    #[test]
    fn test_shuffle_zone_keeps_elements() {
        let mut rng = GameRng::new(3);
        let mut zone: im::Vector<u32> = (0..8).collect();
        rng.shuffle_zone(&mut zone);
        let mut sorted: Vec<u32> = zone.iter().copied().collect();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_serde_roundtrip_via_state() {
        let rng = GameRng::new(9);
        let json = serde_json::to_string(&rng).unwrap();
        let back: GameRng = serde_json::from_str(&json).unwrap();
        assert_eq!(rng.state(), back.state());
    }
}
