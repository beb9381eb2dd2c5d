//! Core engine types: ids, players, configuration, RNG, actions, errors,
//! the game log and the [`GameData`] store.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod action;
pub mod error;
pub mod log;
pub mod state;

pub use entity::{CardId, IdAllocator, PermanentId};
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use config::RulesConfig;
pub use action::{Action, ActionRecord, BlockAssignment};
pub use error::{ConfigError, GameError, GameResult, InvariantViolation, RuleViolation};
pub use log::GameLog;
pub use state::{GameData, PlayerState, StolenCreature, TurnState};
