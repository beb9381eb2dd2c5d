//! Game events that can trigger abilities.

use serde::{Deserialize, Serialize};

use crate::cards::EffectSlot;
use crate::core::{CardId, PermanentId, PlayerId};
use crate::rules::Step;

/// Something that happened, as seen by triggered abilities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A permanent entered the battlefield.
    EntersBattlefield { permanent: PermanentId },

    /// A creature was put into a graveyard from the battlefield.
    ///
    /// `permanent` no longer exists when this is raised from outside the
    /// zone manager; `card` is what it was.
    Dies {
        card: CardId,
        controller: PlayerId,
        permanent: PermanentId,
    },

    /// A step of the active player's turn began.
    StepBegan { step: Step, active: PlayerId },

    /// A player tapped a land for mana.
    LandTapped { player: PlayerId, land: PermanentId },
}

impl GameEvent {
    /// The effect slot this event reads from.
    #[must_use]
    pub fn slot(&self) -> Option<EffectSlot> {
        match self {
            GameEvent::EntersBattlefield { .. } => Some(EffectSlot::EntersBattlefield),
            GameEvent::Dies { .. } => Some(EffectSlot::Dies),
            GameEvent::StepBegan { step: Step::Upkeep, .. } => Some(EffectSlot::Upkeep),
            GameEvent::StepBegan { step: Step::End, .. } => Some(EffectSlot::EndStep),
            GameEvent::StepBegan { .. } => None,
            GameEvent::LandTapped { .. } => Some(EffectSlot::AnyPlayerTapsLand),
        }
    }

    /// Mana-ability triggers resolve on the spot instead of using the stack.
    #[must_use]
    pub fn resolves_immediately(&self) -> bool {
        matches!(self, GameEvent::LandTapped { .. })
    }

    /// The player whose action caused the event, if that matters to effects.
    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            GameEvent::LandTapped { player, .. } => Some(*player),
            _ => None,
        }
    }
}
