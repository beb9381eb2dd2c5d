//! Static abilities.
//!
//! A [`StaticEffect`] is printed on a card and applies for as long as
//! that card is on the battlefield. Each one names a [`Scope`]: the set of
//! permanents it affects, evaluated against the current battlefield every
//! time a characteristic is queried.

use serde::{Deserialize, Serialize};

use crate::cards::{Color, Keywords, Subtype};
use crate::core::{PermanentId, PlayerId};

/// Which permanents a static ability affects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// The permanent with the ability.
    SelfOnly,
    /// Whatever this aura or equipment is attached to.
    Attached,
    /// Creatures its controller controls, itself included.
    OwnCreatures,
    /// Other creatures its controller controls.
    OtherOwnCreatures,
    OpponentCreatures,
    AllCreatures,
    /// Creatures of a given subtype, any controller.
    CreaturesOfSubtype(Subtype),
}

/// What `Scope` needs to know about the permanent being queried.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScopeSubject<'a> {
    pub id: PermanentId,
    pub controller: PlayerId,
    pub is_creature: bool,
    pub subtypes: &'a [Subtype],
}

/// The permanent carrying the ability.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScopeSource {
    pub id: PermanentId,
    pub controller: PlayerId,
    pub attached_to: Option<PermanentId>,
}

impl Scope {
    pub(crate) fn applies(self, source: ScopeSource, subject: ScopeSubject<'_>) -> bool {
        match self {
            Scope::SelfOnly => source.id == subject.id,
            Scope::Attached => source.attached_to == Some(subject.id),
            Scope::OwnCreatures => subject.is_creature && subject.controller == source.controller,
            Scope::OtherOwnCreatures => {
                subject.is_creature
                    && subject.controller == source.controller
                    && subject.id != source.id
            }
            Scope::OpponentCreatures => {
                subject.is_creature && subject.controller != source.controller
            }
            Scope::AllCreatures => subject.is_creature,
            Scope::CreaturesOfSubtype(subtype) => {
                subject.is_creature && subject.subtypes.contains(&subtype)
            }
        }
    }
}

/// A static ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaticEffect {
    /// Every noncreature artifact is a creature with power and toughness
    /// equal to its mana value.
    AnimateArtifacts,

    /// Power and toughness each equal the number of lands (of `subtype`,
    /// if given) its controller controls.
    CountLands { subtype: Option<Subtype> },

    /// Power equals the number of creature cards in all graveyards;
    /// toughness is that plus `toughness_bonus`.
    CountGraveyardCreatures { toughness_bonus: i32 },

    SetPowerToughness {
        power: i32,
        toughness: i32,
        scope: Scope,
    },

    Boost {
        power: i32,
        toughness: i32,
        scope: Scope,
    },

    GrantKeywords { keywords: Keywords, scope: Scope },

    RemoveKeywords { keywords: Keywords, scope: Scope },

    /// Protection from a colour. `None` means the colour chosen as the
    /// source entered the battlefield.
    Protection { color: Option<Color>, scope: Scope },

    /// This creature may assign its combat damage as though it weren't
    /// blocked.
    AssignCombatDamageAsThoughUnblocked,

    /// Its controller controls the enchanted creature.
    ControlEnchanted,
}

impl StaticEffect {
    /// Characteristic-defining abilities only ever apply to their own card.
    #[must_use]
    pub fn is_characteristic_defining(&self) -> bool {
        matches!(
            self,
            StaticEffect::CountLands { .. } | StaticEffect::CountGraveyardCreatures { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn source(id: u32) -> ScopeSource {
        ScopeSource {
            id: PermanentId::new(id),
            controller: P0,
            attached_to: Some(PermanentId::new(7)),
        }
    }

    fn subject(id: u32, controller: PlayerId, subtypes: &[Subtype]) -> ScopeSubject<'_> {
        ScopeSubject {
            id: PermanentId::new(id),
            controller,
            is_creature: true,
            subtypes,
        }
    }

    #[test]
    fn test_own_and_other_creatures() {
        assert!(Scope::OwnCreatures.applies(source(1), subject(1, P0, &[])));
        assert!(!Scope::OtherOwnCreatures.applies(source(1), subject(1, P0, &[])));
        assert!(Scope::OtherOwnCreatures.applies(source(1), subject(2, P0, &[])));
        assert!(!Scope::OwnCreatures.applies(source(1), subject(2, P1, &[])));
        assert!(Scope::OpponentCreatures.applies(source(1), subject(2, P1, &[])));
    }

    #[test]
    fn test_attached_and_subtype() {
        assert!(Scope::Attached.applies(source(1), subject(7, P1, &[])));
        assert!(!Scope::Attached.applies(source(1), subject(8, P1, &[])));

        let goblins = Scope::CreaturesOfSubtype(Subtype::Goblin);
        assert!(goblins.applies(source(1), subject(3, P1, &[Subtype::Goblin])));
        assert!(!goblins.applies(source(1), subject(3, P1, &[Subtype::Elf])));
    }

    #[test]
    fn test_noncreatures_only_match_direct_scopes() {
        let land = ScopeSubject {
            id: PermanentId::new(7),
            controller: P0,
            is_creature: false,
            subtypes: &[],
        };
        assert!(!Scope::AllCreatures.applies(source(1), land));
        assert!(Scope::Attached.applies(source(1), land));
    }
}
