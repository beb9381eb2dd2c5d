//! Game status and outcome.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// How a finished game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Winner(PlayerId),
    Draw,
}

impl GameOutcome {
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameOutcome::Winner(p) if *p == player)
    }
}

/// Whether the game is still being played.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    InProgress,
    Finished(GameOutcome),
}

impl GameStatus {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, GameStatus::Finished(_))
    }

    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        match self {
            GameStatus::InProgress => None,
            GameStatus::Finished(outcome) => Some(*outcome),
        }
    }
}
