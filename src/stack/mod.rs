//! The stack and everything that puts things on it or takes them off.
//!
//! - [`PriorityStack`]: LIFO entries, the priority holder and the pass
//!   counter, plus triggers waiting to be put on the stack.
//! - [`casting`]: validation and payment for playing lands, tapping lands
//!   for mana, casting spells, activating abilities and passing priority.
//! - [`resolution`]: popping the top entry, re-checking its targets and
//!   running its effects (or fizzling it).
//!
//! Stack entries reference everything by id. A target that has left its
//! zone by the time the entry resolves is simply illegal.

pub mod casting;
mod priority;
pub mod resolution;

pub use priority::PriorityStack;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{Card, CardDefinition, CardType};
use crate::core::{PermanentId, PlayerId};
use crate::effects::{Effect, Target, TargetSpec};

/// Unique identifier for a stack entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StackEntryId(pub u32);

impl StackEntryId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for StackEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StackEntry({})", self.0)
    }
}

/// What kind of object a stack entry is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackEntryKind {
    CreatureSpell,
    InstantSpell,
    SorcerySpell,
    EnchantmentSpell,
    ArtifactSpell,
    ActivatedAbility,
    TriggeredAbility,
}

impl StackEntryKind {
    /// The spell kind for a nonland card. Creature wins over artifact,
    /// artifact over enchantment.
    #[must_use]
    pub fn for_spell(def: &CardDefinition) -> Option<Self> {
        [
            (CardType::Creature, Self::CreatureSpell),
            (CardType::Artifact, Self::ArtifactSpell),
            (CardType::Enchantment, Self::EnchantmentSpell),
            (CardType::Instant, Self::InstantSpell),
            (CardType::Sorcery, Self::SorcerySpell),
        ]
        .into_iter()
        .find(|(card_type, _)| def.has_type(*card_type))
        .map(|(_, kind)| kind)
    }

    #[must_use]
    pub fn is_spell(self) -> bool {
        !matches!(self, Self::ActivatedAbility | Self::TriggeredAbility)
    }

    /// Spells that become permanents on resolution.
    #[must_use]
    pub fn is_permanent_spell(self) -> bool {
        matches!(
            self,
            Self::CreatureSpell | Self::EnchantmentSpell | Self::ArtifactSpell
        )
    }
}

/// One pending spell or ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    pub id: StackEntryId,
    pub kind: StackEntryKind,
    pub controller: PlayerId,
    /// The source card as it was when the entry was created.
    pub card: Card,
    /// The permanent an ability came from.
    pub source_permanent: Option<PermanentId>,
    pub effects: Vec<Effect>,
    pub targets: SmallVec<[Target; 2]>,
    /// What the targets had to be when chosen; checked again on resolution.
    pub target_spec: TargetSpec,
    pub x_value: u32,
    /// The player whose action triggered this ability.
    pub event_player: Option<PlayerId>,
}

impl StackEntry {
    /// A spell cast from `card`. The id is assigned when pushed.
    #[must_use]
    pub fn spell(kind: StackEntryKind, controller: PlayerId, card: Card) -> Self {
        let effects = card
            .def
            .effects_in(crate::cards::EffectSlot::Spell)
            .to_vec();
        let target_spec = card.def.target.clone();
        Self {
            id: StackEntryId::new(0),
            kind,
            controller,
            card,
            source_permanent: None,
            effects,
            targets: SmallVec::new(),
            target_spec,
            x_value: 0,
            event_player: None,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: SmallVec<[Target; 2]>) -> Self {
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn with_x(mut self, x_value: u32) -> Self {
        self.x_value = x_value;
        self
    }

    /// Name shown in the log.
    #[must_use]
    pub fn description(&self) -> String {
        if self.kind.is_spell() {
            self.card.name().to_string()
        } else {
            format!("{}'s ability", self.card.name())
        }
    }
}
