//! Battlefield objects.
//!
//! A [`Permanent`] wraps one card while it is on the battlefield and holds
//! all of its mutable state. Leaving the battlefield destroys the
//! permanent; coming back creates a new one with a new id.
//!
//! Only *raw* state lives here. The permanent's effective power,
//! toughness, keywords and types come from [`crate::continuous`], which
//! folds these fields together with every static effect in play.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::types::{Color, Keywords, Subtype};
use crate::core::{CardId, PermanentId, PlayerId};

/// A card on the battlefield.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permanent {
    pub id: PermanentId,
    pub card: CardId,
    /// May differ from the card's owner under a control change.
    pub controller: PlayerId,

    pub tapped: bool,
    pub summoning_sick: bool,

    // === Combat ===
    pub attacking: bool,
    pub blocking: bool,
    /// Attackers this permanent blocks, in declaration order.
    pub blocking_targets: SmallVec<[PermanentId; 1]>,

    // === Until end of turn ===
    /// Damage marked this turn.
    pub damage: i32,
    pub power_modifier: i32,
    pub toughness_modifier: i32,
    pub granted_keywords: Keywords,
    pub removed_keywords: Keywords,

    pub granted_subtypes: SmallVec<[Subtype; 1]>,
    pub regeneration_shields: u32,
    /// The next this-much damage to this permanent is prevented.
    pub prevention_shield: i32,
    /// The permanent this aura/equipment is attached to.
    pub attached_to: Option<PermanentId>,
    /// Colour chosen as it entered, if any.
    pub chosen_color: Option<Color>,
    /// Land-type words rewritten on this permanent (from, to).
    pub text_replacements: SmallVec<[(Subtype, Subtype); 1]>,
    /// Activations this turn, per ability index.
    pub ability_uses: SmallVec<[(usize, u32); 1]>,
}

impl Permanent {
    /// A freshly entered, summoning-sick permanent.
    #[must_use]
    pub fn new(id: PermanentId, card: CardId, controller: PlayerId) -> Self {
        Self {
            id,
            card,
            controller,
            tapped: false,
            summoning_sick: true,
            attacking: false,
            blocking: false,
            blocking_targets: SmallVec::new(),
            damage: 0,
            power_modifier: 0,
            toughness_modifier: 0,
            granted_keywords: Keywords::empty(),
            removed_keywords: Keywords::empty(),
            granted_subtypes: SmallVec::new(),
            regeneration_shields: 0,
            prevention_shield: 0,
            attached_to: None,
            chosen_color: None,
            text_replacements: SmallVec::new(),
            ability_uses: SmallVec::new(),
        }
    }

    /// Remove from combat without touching tapped state.
    pub fn remove_from_combat(&mut self) {
        self.attacking = false;
        self.blocking = false;
        self.blocking_targets.clear();
    }

    /// Clear everything that lasts "until end of turn".
    pub fn clear_end_of_turn(&mut self) {
        self.damage = 0;
        self.power_modifier = 0;
        self.toughness_modifier = 0;
        self.granted_keywords = Keywords::empty();
        self.removed_keywords = Keywords::empty();
        self.regeneration_shields = 0;
        self.prevention_shield = 0;
    }

    /// Consume one regeneration shield: tap, leave combat, clear damage.
    ///
    /// Returns `false` when there is no shield to consume.
    pub fn regenerate(&mut self) -> bool {
        if self.regeneration_shields == 0 {
            return false;
        }
        self.regeneration_shields -= 1;
        self.tapped = true;
        self.damage = 0;
        self.remove_from_combat();
        true
    }

    /// Activations of ability `index` this turn.
    #[must_use]
    pub fn uses_of(&self, index: usize) -> u32 {
        self.ability_uses
            .iter()
            .find(|(i, _)| *i == index)
            .map_or(0, |(_, n)| *n)
    }

    pub fn record_use(&mut self, index: usize) {
        match self.ability_uses.iter_mut().find(|(i, _)| *i == index) {
            Some((_, n)) => *n += 1,
            None => self.ability_uses.push((index, 1)),
        }
    }

    /// Apply text replacements to a land-type word.
    #[must_use]
    pub fn replaced(&self, subtype: Subtype) -> Subtype {
        self.text_replacements
            .iter()
            .find(|(from, _)| *from == subtype)
            .map_or(subtype, |(_, to)| *to)
    }
}
