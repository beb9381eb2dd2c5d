//! Continuous effects.
//!
//! Pure queries over the current battlefield. Every function here
//! recomputes from scratch through [`layers::compute`]; there is no cache
//! to invalidate, so a land entering or a creature card hitting a
//! graveyard is reflected by the very next call.

pub mod layers;
mod statics;

pub use layers::Characteristics;
pub use statics::{Scope, StaticEffect};

use crate::cards::{CardType, Color, Keywords, Subtype};
use crate::core::{GameData, PermanentId, PlayerId};

/// Effective characteristics of a permanent.
#[must_use]
pub fn characteristics(game: &GameData, id: PermanentId) -> Option<Characteristics> {
    layers::compute(game, id)
}

/// Effective power; 0 for noncreatures and missing permanents.
#[must_use]
pub fn effective_power(game: &GameData, id: PermanentId) -> i32 {
    characteristics(game, id).and_then(|c| c.power).unwrap_or(0)
}

/// Effective toughness; 0 for noncreatures and missing permanents.
#[must_use]
pub fn effective_toughness(game: &GameData, id: PermanentId) -> i32 {
    characteristics(game, id).and_then(|c| c.toughness).unwrap_or(0)
}

/// Whether the permanent has every keyword in `keyword`.
#[must_use]
pub fn has_keyword(game: &GameData, id: PermanentId, keyword: Keywords) -> bool {
    characteristics(game, id).is_some_and(|c| c.keywords.contains(keyword))
}

#[must_use]
pub fn is_creature(game: &GameData, id: PermanentId) -> bool {
    characteristics(game, id).is_some_and(|c| c.is_creature())
}

#[must_use]
pub fn has_type(game: &GameData, id: PermanentId, card_type: CardType) -> bool {
    characteristics(game, id).is_some_and(|c| c.has_type(card_type))
}

#[must_use]
pub fn has_subtype(game: &GameData, id: PermanentId, subtype: Subtype) -> bool {
    characteristics(game, id).is_some_and(|c| c.subtypes.contains(&subtype))
}

#[must_use]
pub fn controller_of(game: &GameData, id: PermanentId) -> Option<PlayerId> {
    characteristics(game, id).map(|c| c.controller)
}

#[must_use]
pub fn color_of(game: &GameData, id: PermanentId) -> Option<Color> {
    characteristics(game, id).and_then(|c| c.color)
}

/// Whether the permanent has protection from `color`. Colourless sources
/// are never stopped.
#[must_use]
pub fn has_protection_from(game: &GameData, id: PermanentId, color: Option<Color>) -> bool {
    let Some(color) = color else {
        return false;
    };
    characteristics(game, id).is_some_and(|c| c.protections.contains(&color))
}

#[must_use]
pub fn assigns_damage_as_though_unblocked(game: &GameData, id: PermanentId) -> bool {
    characteristics(game, id).is_some_and(|c| c.damage_as_though_unblocked)
}
