//! Card templates.
//!
//! A [`CardDefinition`] is the immutable printed data of a card: name,
//! types, cost, colour, base power/toughness, keywords, what it targets,
//! its effect slots, static abilities and activated abilities.
//!
//! A [`Card`] is one physical copy (or token) in a game: a definition plus
//! a stable [`CardId`] and an owner. Cards never change; everything that
//! happens to a card on the battlefield lives on its `Permanent`.
//!
//! ## Example
//!
//! ```
//! use ccg_rules::cards::{CardDefinition, Color, Keywords, Subtype};
//! use ccg_rules::mana::ManaCost;
//!
//! let rhox = CardDefinition::creature("Rhox", ManaCost::new(4).with_colored(Color::Green, 2), 5, 5)
//!     .with_subtypes(&[Subtype::Rhino, Subtype::Beast]);
//!
//! assert_eq!(rhox.color, Some(Color::Green));
//! assert!(rhox.is_creature_card());
//! assert_eq!(rhox.keywords, Keywords::empty());
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::types::{CardType, Color, Keywords, Subtype};
use crate::continuous::StaticEffect;
use crate::core::{CardId, PlayerId};
use crate::effects::{Effect, PermanentFilter, TargetSpec};
use crate::mana::{ManaColor, ManaCost};

/// When a card's effects are executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectSlot {
    /// On resolution. For permanent spells: as the permanent enters.
    Spell,
    /// Triggered when this permanent enters the battlefield.
    EntersBattlefield,
    /// Triggered when this creature is put into a graveyard from the battlefield.
    Dies,
    /// Triggered at the beginning of its controller's upkeep.
    Upkeep,
    /// Triggered at the beginning of its controller's end step.
    EndStep,
    /// Whenever any player taps a land for mana. Resolves immediately.
    AnyPlayerTapsLand,
}

/// An activated ability: `[cost], [{T}]: effects`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    pub cost: ManaCost,
    pub tap: bool,
    pub effects: Vec<Effect>,
    pub target: TargetSpec,
    pub sorcery_speed: bool,
    pub per_turn_limit: Option<u32>,
}

impl ActivatedAbility {
    #[must_use]
    pub fn new(cost: ManaCost, effects: Vec<Effect>) -> Self {
        Self {
            cost,
            tap: false,
            effects,
            target: TargetSpec::None,
            sorcery_speed: false,
            per_turn_limit: None,
        }
    }

    #[must_use]
    pub fn with_tap(mut self) -> Self {
        self.tap = true;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn sorcery_speed(mut self) -> Self {
        self.sorcery_speed = true;
        self
    }

    #[must_use]
    pub fn with_per_turn_limit(mut self, limit: u32) -> Self {
        self.per_turn_limit = Some(limit);
        self
    }

    /// `Equip [cost]`: attach to a creature you control, sorcery speed.
    #[must_use]
    pub fn equip(cost: ManaCost) -> Self {
        Self::new(cost, vec![Effect::Equip])
            .with_target(TargetSpec::OwnPermanent(PermanentFilter::Creature))
            .sorcery_speed()
    }
}

/// Printed card data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub name: String,
    pub types: SmallVec<[CardType; 2]>,
    pub subtypes: SmallVec<[Subtype; 2]>,
    #[serde(default)]
    pub legendary: bool,
    pub mana_cost: ManaCost,
    pub color: Option<Color>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub keywords: Keywords,
    /// Mana a land adds when tapped.
    pub produces: Option<ManaColor>,
    /// Targets chosen on cast (for auras: what it enchants).
    pub target: TargetSpec,
    pub effects: FxHashMap<EffectSlot, Vec<Effect>>,
    pub statics: Vec<StaticEffect>,
    pub abilities: Vec<ActivatedAbility>,
}

impl CardDefinition {
    /// A card of a single type, coloured by the first coloured symbol of its cost.
    #[must_use]
    pub fn new(name: impl Into<String>, card_type: CardType, mana_cost: ManaCost) -> Self {
        let color = color_of(&mana_cost);
        Self {
            name: name.into(),
            types: SmallVec::from_slice(&[card_type]),
            subtypes: SmallVec::new(),
            legendary: false,
            mana_cost,
            color,
            power: None,
            toughness: None,
            keywords: Keywords::empty(),
            produces: None,
            target: TargetSpec::None,
            effects: FxHashMap::default(),
            statics: Vec::new(),
            abilities: Vec::new(),
        }
    }

    #[must_use]
    pub fn creature(name: impl Into<String>, mana_cost: ManaCost, power: i32, toughness: i32) -> Self {
        let mut card = Self::new(name, CardType::Creature, mana_cost);
        card.power = Some(power);
        card.toughness = Some(toughness);
        card
    }

    #[must_use]
    pub fn instant(name: impl Into<String>, mana_cost: ManaCost) -> Self {
        Self::new(name, CardType::Instant, mana_cost)
    }

    #[must_use]
    pub fn sorcery(name: impl Into<String>, mana_cost: ManaCost) -> Self {
        Self::new(name, CardType::Sorcery, mana_cost)
    }

    #[must_use]
    pub fn enchantment(name: impl Into<String>, mana_cost: ManaCost) -> Self {
        Self::new(name, CardType::Enchantment, mana_cost)
    }

    #[must_use]
    pub fn artifact(name: impl Into<String>, mana_cost: ManaCost) -> Self {
        Self::new(name, CardType::Artifact, mana_cost)
    }

    /// An aura that enchants whatever `target` allows.
    #[must_use]
    pub fn aura(name: impl Into<String>, mana_cost: ManaCost, target: TargetSpec) -> Self {
        Self::new(name, CardType::Enchantment, mana_cost)
            .with_subtypes(&[Subtype::Aura])
            .with_target(target)
    }

    /// Equipment with the given equip cost.
    #[must_use]
    pub fn equipment(name: impl Into<String>, mana_cost: ManaCost, equip_cost: ManaCost) -> Self {
        Self::new(name, CardType::Artifact, mana_cost)
            .with_subtypes(&[Subtype::Equipment])
            .with_ability(ActivatedAbility::equip(equip_cost))
    }

    /// A basic land of the given type.
    #[must_use]
    pub fn basic_land(subtype: Subtype) -> Self {
        let produces = match subtype {
            Subtype::Plains => ManaColor::White,
            Subtype::Island => ManaColor::Blue,
            Subtype::Swamp => ManaColor::Black,
            Subtype::Mountain => ManaColor::Red,
            Subtype::Forest => ManaColor::Green,
            _ => ManaColor::Colorless,
        };
        let mut land = Self::new(subtype.to_string(), CardType::Land, ManaCost::free());
        land.subtypes.push(subtype);
        land.produces = Some(produces);
        land
    }

    // === Builders ===

    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        if !self.types.contains(&card_type) {
            self.types.push(card_type);
        }
        self
    }

    #[must_use]
    pub fn with_subtypes(mut self, subtypes: &[Subtype]) -> Self {
        self.subtypes.extend_from_slice(subtypes);
        self
    }

    /// Subject to the legend rule.
    #[must_use]
    pub fn legendary(mut self) -> Self {
        self.legendary = true;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_power_toughness(mut self, power: i32, toughness: i32) -> Self {
        self.power = Some(power);
        self.toughness = Some(toughness);
        self
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: Keywords) -> Self {
        self.keywords |= keywords;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_effect(mut self, slot: EffectSlot, effect: Effect) -> Self {
        self.effects.entry(slot).or_default().push(effect);
        self
    }

    #[must_use]
    pub fn with_static(mut self, effect: StaticEffect) -> Self {
        self.statics.push(effect);
        self
    }

    #[must_use]
    pub fn with_ability(mut self, ability: ActivatedAbility) -> Self {
        self.abilities.push(ability);
        self
    }

    // === Queries ===

    #[must_use]
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    #[must_use]
    pub fn has_subtype(&self, subtype: Subtype) -> bool {
        self.subtypes.contains(&subtype)
    }

    /// Printed creature type (ignores animation effects).
    #[must_use]
    pub fn is_creature_card(&self) -> bool {
        self.has_type(CardType::Creature)
    }

    #[must_use]
    pub fn is_permanent_card(&self) -> bool {
        self.types.iter().all(|t| t.is_permanent())
    }

    #[must_use]
    pub fn is_aura(&self) -> bool {
        self.has_subtype(Subtype::Aura)
    }

    /// Effects in `slot`, empty if none.
    #[must_use]
    pub fn effects_in(&self, slot: EffectSlot) -> &[Effect] {
        self.effects.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn color_of(cost: &ManaCost) -> Option<Color> {
    use strum::IntoEnumIterator;
    Color::iter().find(|c| cost.colored[c.index()] > 0)
}

/// One card in a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub owner: PlayerId,
    pub is_token: bool,
    pub def: CardDefinition,
}

impl Card {
    #[must_use]
    pub fn new(id: CardId, owner: PlayerId, def: CardDefinition) -> Self {
        Self {
            id,
            owner,
            is_token: false,
            def,
        }
    }

    #[must_use]
    pub fn token(id: CardId, owner: PlayerId, def: CardDefinition) -> Self {
        Self {
            id,
            owner,
            is_token: true,
            def,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_inferred_from_cost() {
        let shock = CardDefinition::instant("Shock", ManaCost::new(0).with_colored(Color::Red, 1));
        assert_eq!(shock.color, Some(Color::Red));

        let golem = CardDefinition::artifact("Golem", ManaCost::new(3));
        assert_eq!(golem.color, None);
    }

    #[test]
    fn test_basic_land() {
        let island = CardDefinition::basic_land(Subtype::Island);
        assert_eq!(island.name, "Island");
        assert!(island.has_type(CardType::Land));
        assert!(island.has_subtype(Subtype::Island));
        assert_eq!(island.produces, Some(ManaColor::Blue));
    }

    #[test]
    fn test_effect_slots() {
        let card = CardDefinition::sorcery("Divination", ManaCost::new(2))
            .with_effect(EffectSlot::Spell, Effect::DrawCards(2));
        assert_eq!(card.effects_in(EffectSlot::Spell), &[Effect::DrawCards(2)]);
        assert!(card.effects_in(EffectSlot::Dies).is_empty());
    }

    #[test]
    fn test_artifact_creature_is_permanent() {
        let card = CardDefinition::artifact("Ornithopter", ManaCost::free())
            .with_type(CardType::Creature)
            .with_power_toughness(0, 2);
        assert!(card.is_creature_card());
        assert!(card.is_permanent_card());
        assert!(!CardDefinition::instant("Shock", ManaCost::free()).is_permanent_card());
    }

    #[test]
    fn test_equipment_has_equip_ability() {
        let sword = CardDefinition::equipment("Bone Saw", ManaCost::new(0), ManaCost::new(1));
        assert!(sword.has_type(CardType::Artifact));
        assert!(sword.has_subtype(Subtype::Equipment));
        let equip = &sword.abilities[0];
        assert!(equip.sorcery_speed);
        assert_eq!(equip.effects, vec![Effect::Equip]);
        assert_eq!(equip.target, TargetSpec::OwnPermanent(PermanentFilter::Creature));
    }
}
