//! Rules configuration.
//!
//! A game is configured once at creation. Everything here is a house-rule
//! knob with a tournament default; nothing changes mid-game.
//!
//! ```
//! use ccg_rules::core::RulesConfig;
//!
//! let config = RulesConfig::default()
//!     .with_starting_life(30)
//!     .with_seed(7);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.starting_life, 30);
//! ```

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Game-wide rule parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Number of seats (2..=8).
    pub player_count: usize,

    pub starting_life: i32,

    pub opening_hand_size: usize,

    /// Cleanup discards down to this many cards.
    pub max_hand_size: usize,

    /// How many attackers a single creature may block.
    pub blocks_per_creature: usize,

    /// The starting player skips the draw of turn 1.
    pub skip_first_draw: bool,

    /// Upper bound on SBA sweeps before the engine reports non-convergence.
    pub sba_sweep_limit: usize,

    /// Seed for every shuffle in the game.
    pub seed: u64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            starting_life: 20,
            opening_hand_size: 7,
            max_hand_size: 7,
            blocks_per_creature: 1,
            skip_first_draw: true,
            sba_sweep_limit: 64,
            seed: 0,
        }
    }
}

impl RulesConfig {
    #[must_use]
    pub fn with_player_count(mut self, player_count: usize) -> Self {
        self.player_count = player_count;
        self
    }

    #[must_use]
    pub fn with_starting_life(mut self, life: i32) -> Self {
        self.starting_life = life;
        self
    }

    #[must_use]
    pub fn with_opening_hand_size(mut self, size: usize) -> Self {
        self.opening_hand_size = size;
        self
    }

    #[must_use]
    pub fn with_max_hand_size(mut self, size: usize) -> Self {
        self.max_hand_size = size;
        self
    }

    #[must_use]
    pub fn with_blocks_per_creature(mut self, blocks: usize) -> Self {
        self.blocks_per_creature = blocks;
        self
    }

    #[must_use]
    pub fn with_skip_first_draw(mut self, skip: bool) -> Self {
        self.skip_first_draw = skip;
        self
    }

    #[must_use]
    pub fn with_sba_sweep_limit(mut self, limit: usize) -> Self {
        self.sba_sweep_limit = limit;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the configuration before a game is built from it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=8).contains(&self.player_count) {
            return Err(ConfigError::PlayerCount(self.player_count));
        }
        if self.starting_life <= 0 {
            return Err(ConfigError::StartingLife(self.starting_life));
        }
        if self.blocks_per_creature == 0 {
            return Err(ConfigError::BlocksPerCreature);
        }
        if self.sba_sweep_limit == 0 {
            return Err(ConfigError::SweepLimit);
        }
        Ok(())
    }
}
