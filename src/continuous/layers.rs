//! Layered characteristic computation.
//!
//! Starting from the printed card, effects are applied in a fixed order:
//!
//! 1. control (the permanent's recorded controller),
//! 2. type changes (animated artifacts),
//! 3. characteristic-defining abilities (land count, graveyard count),
//! 4. power/toughness setting effects,
//! 5. power/toughness modifications: static boosts, then until-end-of-turn
//!    modifiers,
//! 6. keyword grants, then keyword removals; protection.
//!
//! Setting beats modifying because layer 4 runs first. Everything inside a
//! layer is additive. Nothing is cached: two calls separated by any
//! mutation may disagree.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::statics::{ScopeSource, ScopeSubject, StaticEffect};
use crate::cards::{CardType, Color, Keywords, Subtype};
use crate::core::{GameData, PermanentId, PlayerId};

/// A permanent's effective characteristics at one instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    pub controller: PlayerId,
    pub types: SmallVec<[CardType; 2]>,
    pub subtypes: SmallVec<[Subtype; 2]>,
    pub color: Option<Color>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub keywords: Keywords,
    pub protections: SmallVec<[Color; 1]>,
    pub damage_as_though_unblocked: bool,
}

impl Characteristics {
    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.types.contains(&CardType::Creature)
    }

    #[must_use]
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    /// "Creature — Goblin Wizard" style type line.
    #[must_use]
    pub fn type_line(&self) -> String {
        let types: Vec<String> = self.types.iter().map(ToString::to_string).collect();
        if self.subtypes.is_empty() {
            return types.join(" ");
        }
        let subtypes: Vec<String> = self.subtypes.iter().map(ToString::to_string).collect();
        format!("{} - {}", types.join(" "), subtypes.join(" "))
    }
}

/// Every static ability on the battlefield with the permanent carrying it.
fn active_statics(game: &GameData) -> Vec<(ScopeSource, &StaticEffect)> {
    game.all_permanents()
        .filter_map(|id| {
            let perm = game.permanent(id)?;
            let card = game.cards.get(perm.card)?;
            let source = ScopeSource {
                id,
                controller: perm.controller,
                attached_to: perm.attached_to,
            };
            Some(card.def.statics.iter().map(move |s| (source, s)))
        })
        .flatten()
        .collect()
}

fn lands_controlled(game: &GameData, player: PlayerId, subtype: Option<Subtype>) -> i32 {
    let count = game
        .player(player)
        .battlefield
        .iter()
        .filter_map(|id| game.permanent(*id))
        .filter_map(|perm| game.cards.get(perm.card).map(|card| (perm, card)))
        .filter(|(perm, card)| {
            card.def.has_type(CardType::Land)
                && subtype.map_or(true, |s| {
                    card.def.has_subtype(s) || perm.granted_subtypes.contains(&s)
                })
        })
        .count();
    count as i32
}

fn creature_cards_in_graveyards(game: &GameData) -> i32 {
    let count = game
        .players
        .iter()
        .flat_map(|(_, state)| state.graveyard.iter())
        .filter_map(|id| game.cards.get(*id))
        .filter(|card| card.def.is_creature_card())
        .count();
    count as i32
}

/// Compute a permanent's effective characteristics. `None` if it is not
/// on the battlefield.
#[must_use]
pub fn compute(game: &GameData, id: PermanentId) -> Option<Characteristics> {
    let perm = game.permanent(id)?;
    let def = &game.cards.get(perm.card)?.def;
    let statics = active_statics(game);

    // Layer 1: control.
    let controller = perm.controller;

    // Layer 2: type.
    let mut types = def.types.clone();
    let mut power = def.power;
    let mut toughness = def.toughness;
    let animate = statics
        .iter()
        .any(|(_, s)| matches!(s, StaticEffect::AnimateArtifacts));
    if animate && def.has_type(CardType::Artifact) && !def.has_type(CardType::Creature) {
        types.push(CardType::Creature);
        let value = def.mana_cost.mana_value() as i32;
        power = Some(value);
        toughness = Some(value);
    }
    let is_creature = types.contains(&CardType::Creature);

    let mut subtypes = def.subtypes.clone();
    for subtype in &perm.granted_subtypes {
        if !subtypes.contains(subtype) {
            subtypes.push(*subtype);
        }
    }

    // Layer 3: characteristic-defining abilities.
    for effect in def.statics.iter().filter(|s| s.is_characteristic_defining()) {
        match effect {
            StaticEffect::CountLands { subtype } => {
                let n = lands_controlled(game, controller, *subtype);
                power = Some(n);
                toughness = Some(n);
            }
            StaticEffect::CountGraveyardCreatures { toughness_bonus } => {
                let n = creature_cards_in_graveyards(game);
                power = Some(n);
                toughness = Some(n + toughness_bonus);
            }
            _ => {}
        }
    }

    let subject = ScopeSubject {
        id,
        controller,
        is_creature,
        subtypes: &subtypes,
    };
    let applicable: Vec<(ScopeSource, &StaticEffect)> = statics
        .into_iter()
        .filter(|(source, effect)| match effect {
            StaticEffect::SetPowerToughness { scope, .. }
            | StaticEffect::Boost { scope, .. }
            | StaticEffect::GrantKeywords { scope, .. }
            | StaticEffect::RemoveKeywords { scope, .. }
            | StaticEffect::Protection { scope, .. } => scope.applies(*source, subject),
            StaticEffect::AssignCombatDamageAsThoughUnblocked => source.id == id,
            _ => false,
        })
        .collect();

    // Layer 4: setting.
    for (_, effect) in &applicable {
        if let StaticEffect::SetPowerToughness {
            power: p,
            toughness: t,
            ..
        } = effect
        {
            power = Some(*p);
            toughness = Some(*t);
        }
    }

    // Layer 5: modifying. Static boosts, then until-end-of-turn effects.
    if is_creature {
        let (mut dp, mut dt) = (0, 0);
        for (_, effect) in &applicable {
            if let StaticEffect::Boost {
                power: p,
                toughness: t,
                ..
            } = effect
            {
                dp += p;
                dt += t;
            }
        }
        dp += perm.power_modifier;
        dt += perm.toughness_modifier;
        power = Some(power.unwrap_or(0) + dp);
        toughness = Some(toughness.unwrap_or(0) + dt);
    } else {
        power = None;
        toughness = None;
    }

    // Layer 6: abilities.
    let mut keywords = def.keywords;
    let mut protections: SmallVec<[Color; 1]> = SmallVec::new();
    let mut damage_as_though_unblocked = false;
    for (source, effect) in &applicable {
        match effect {
            StaticEffect::GrantKeywords { keywords: k, .. } => keywords |= *k,
            StaticEffect::Protection { color, .. } => {
                let chosen = color.or_else(|| game.permanent(source.id).and_then(|p| p.chosen_color));
                if let Some(c) = chosen {
                    if !protections.contains(&c) {
                        protections.push(c);
                    }
                }
            }
            StaticEffect::AssignCombatDamageAsThoughUnblocked => damage_as_though_unblocked = true,
            _ => {}
        }
    }
    keywords |= perm.granted_keywords;
    for (_, effect) in &applicable {
        if let StaticEffect::RemoveKeywords { keywords: k, .. } = effect {
            keywords.remove(*k);
        }
    }
    keywords.remove(perm.removed_keywords);

    Some(Characteristics {
        controller,
        types,
        subtypes,
        color: def.color,
        power,
        toughness,
        keywords,
        protections,
        damage_as_though_unblocked,
    })
}
