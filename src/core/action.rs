//! Inbound player actions.
//!
//! Every message a connected client can send maps to one [`Action`]:
//! play or tap a land, cast a spell, activate an ability, pass priority,
//! declare attackers or blockers, or answer a pending prompt. Battlefield
//! and hand positions are indices into the acting player's own zones (for
//! blockers: the defender's battlefield and the attacker's battlefield).
//!
//! ```
//! use ccg_rules::core::{Action, ActionRecord, PlayerId};
//!
//! let cast = Action::cast(0);
//! let record = ActionRecord::new(PlayerId::new(1), 3, cast.clone());
//! assert_eq!(record.action, cast);
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::player::PlayerId;
use crate::effects::Target;
use crate::interaction::Choice;

/// One blocker/attacker pairing in a block declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockAssignment {
    /// Index into the defending player's battlefield.
    pub blocker: usize,
    /// Index into the attacking player's battlefield.
    pub attacker: usize,
}

impl BlockAssignment {
    #[must_use]
    pub const fn new(blocker: usize, attacker: usize) -> Self {
        Self { blocker, attacker }
    }
}

/// A player action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    PlayLand {
        hand_index: usize,
    },

    /// Tap a land for mana. Does not use the stack.
    TapLand {
        index: usize,
    },

    CastSpell {
        hand_index: usize,
        x_value: u32,
        targets: SmallVec<[Target; 2]>,
    },

    ActivateAbility {
        index: usize,
        ability: usize,
        x_value: u32,
        targets: SmallVec<[Target; 2]>,
    },

    PassPriority,

    DeclareAttackers {
        indices: Vec<usize>,
    },

    DeclareBlockers {
        assignments: Vec<BlockAssignment>,
    },

    SubmitChoice(Choice),
}

impl Action {
    /// Cast a card with no targets and no X.
    #[must_use]
    pub fn cast(hand_index: usize) -> Self {
        Self::CastSpell {
            hand_index,
            x_value: 0,
            targets: SmallVec::new(),
        }
    }

    /// Cast a card at the given targets.
    #[must_use]
    pub fn cast_targeting(hand_index: usize, targets: &[Target]) -> Self {
        Self::CastSpell {
            hand_index,
            x_value: 0,
            targets: targets.iter().copied().collect(),
        }
    }

    /// Cast a card with a chosen X.
    #[must_use]
    pub fn cast_with_x(hand_index: usize, x_value: u32) -> Self {
        Self::CastSpell {
            hand_index,
            x_value,
            targets: SmallVec::new(),
        }
    }

    /// Activate an ability with the given targets.
    #[must_use]
    pub fn activate(index: usize, ability: usize, targets: &[Target]) -> Self {
        Self::ActivateAbility {
            index,
            ability,
            x_value: 0,
            targets: targets.iter().copied().collect(),
        }
    }

    /// Short label for diagnostics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Action::PlayLand { .. } => "play-land",
            Action::TapLand { .. } => "tap-land",
            Action::CastSpell { .. } => "cast",
            Action::ActivateAbility { .. } => "activate",
            Action::PassPriority => "pass",
            Action::DeclareAttackers { .. } => "declare-attackers",
            Action::DeclareBlockers { .. } => "declare-blockers",
            Action::SubmitChoice(_) => "submit-choice",
        }
    }
}

/// An accepted action, kept in the game's history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player: PlayerId,
    pub turn: u32,
    pub action: Action,
}

impl ActionRecord {
    #[must_use]
    pub fn new(player: PlayerId, turn: u32, action: Action) -> Self {
        Self { player, turn, action }
    }
}
