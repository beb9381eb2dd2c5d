//! Effect primitives.
//!
//! Cards are data: every spell, trigger and activated ability is an
//! ordered list of [`Effect`]s. Each primitive knows which targets it
//! acts on (the still-legal targets of its stack entry, or a fixed
//! [`Recipient`]) and whether it may need a player decision.

use serde::{Deserialize, Serialize};

use super::targeting::{CardFilter, PermanentFilter};
use crate::cards::{CardDefinition, Color, Keywords, Subtype};
use crate::core::PlayerId;

/// A number that may depend on X.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Amount {
    Fixed(i32),
    X,
}

impl Amount {
    /// The amount for a given X. Casting rejects an X that doesn't fit
    /// in an `i32`, so the clamp never applies to a legal spell.
    #[must_use]
    pub fn resolve(self, x_value: u32) -> i32 {
        match self {
            Amount::Fixed(n) => n,
            Amount::X => i32::try_from(x_value).unwrap_or(i32::MAX),
        }
    }
}

/// Which players an untargeted or player-directed effect reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// The entry's targets (players and permanents).
    Targets,
    Controller,
    EachOpponent,
    EachPlayer,
    /// The player whose action triggered the ability.
    EventPlayer,
    Player(PlayerId),
}

/// One step of a spell or ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    // === Life and damage ===
    DealDamage { amount: Amount, to: Recipient },
    GainLife { amount: Amount, to: Recipient },
    LoseLife { amount: Amount, to: Recipient },

    /// The controller draws.
    DrawCards(u32),

    // === Permanents (targets, or the source permanent when untargeted) ===
    Destroy { can_regenerate: bool },
    Tap,
    Untap,
    /// +N/+N until end of turn.
    Pump { power: i32, toughness: i32 },
    /// Keywords until end of turn.
    GrantKeywords(Keywords),
    /// Add a regeneration shield.
    Regenerate,
    GainControl { until_end_of_turn: bool },
    /// Return target permanents to their owners' hands.
    ReturnToHand,
    /// Rewrite a land-type word on target permanents.
    ReplaceLandWord { from: Subtype, to: Subtype },
    /// Attach the source equipment to the target creature.
    Equip,

    // === Prevention, until end of turn ===
    /// The next N damage to each target (player or permanent).
    PreventDamage(i32),
    /// The next N damage to anything.
    PreventNextDamage(i32),
    PreventAllCombatDamage,
    PreventDamageFromColors(Vec<Color>),

    // === Stack ===
    /// Counter target spells.
    Counter,

    // === Tokens and graveyards ===
    CreateTokens { count: Amount, token: Box<CardDefinition> },
    /// Exile each targeted graveyard card, then create one token per card
    /// actually exiled.
    ExileTargetsCreateTokens { token: Box<CardDefinition> },

    // === Choices ===
    Discard { count: u32, who: Recipient },
    /// Return a card from the controller's graveyard to their hand.
    ReturnFromGraveyard { filter: CardFilter, optional: bool },
    /// Choose a colour for the source permanent.
    ChooseColor,
    /// "You may ..." Runs `effect` only if the controller agrees.
    May { effect: Box<Effect>, prompt: String },
    /// Search the controller's library for a card, then shuffle.
    SearchLibrary {
        filter: CardFilter,
        to_battlefield: bool,
        can_fail: bool,
    },
    /// Each affected player sacrifices a permanent of their choice.
    Sacrifice { filter: PermanentFilter, who: Recipient },

    // === Game ===
    /// The controller wins if their life is at least this much on resolution.
    WinIfLifeAtLeast(i32),

    /// An effect implemented outside the engine, looked up by name in the
    /// [`EffectCatalog`](super::EffectCatalog).
    Custom(String),
}

impl Effect {
    /// `n` damage to the entry's targets.
    #[must_use]
    pub fn damage(n: i32) -> Self {
        Effect::DealDamage {
            amount: Amount::Fixed(n),
            to: Recipient::Targets,
        }
    }

    /// `n` damage to a fixed recipient.
    #[must_use]
    pub fn damage_to(n: i32, to: Recipient) -> Self {
        Effect::DealDamage {
            amount: Amount::Fixed(n),
            to,
        }
    }

    #[must_use]
    pub fn gain_life(n: i32) -> Self {
        Effect::GainLife {
            amount: Amount::Fixed(n),
            to: Recipient::Controller,
        }
    }

    #[must_use]
    pub fn pump(power: i32, toughness: i32) -> Self {
        Effect::Pump { power, toughness }
    }

    #[must_use]
    pub fn destroy() -> Self {
        Effect::Destroy {
            can_regenerate: true,
        }
    }

    #[must_use]
    pub fn may(effect: Effect, prompt: impl Into<String>) -> Self {
        Effect::May {
            effect: Box::new(effect),
            prompt: prompt.into(),
        }
    }

    #[must_use]
    pub fn discard(count: u32, who: Recipient) -> Self {
        Effect::Discard { count, who }
    }

    /// Whether the effect can stop resolution to ask a player something.
    #[must_use]
    pub fn may_prompt(&self) -> bool {
        matches!(
            self,
            Effect::Discard { .. }
                | Effect::ReturnFromGraveyard { .. }
                | Effect::ChooseColor
                | Effect::May { .. }
                | Effect::SearchLibrary { .. }
                | Effect::Sacrifice { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount() {
        assert_eq!(Amount::Fixed(3).resolve(7), 3);
        assert_eq!(Amount::X.resolve(7), 7);
        assert_eq!(Amount::X.resolve(u32::MAX), i32::MAX);
    }

    #[test]
    fn test_constructors() {
        assert_eq!(
            Effect::damage(2),
            Effect::DealDamage {
                amount: Amount::Fixed(2),
                to: Recipient::Targets
            }
        );
        assert!(Effect::may(Effect::DrawCards(1), "Draw a card?").may_prompt());
        assert!(!Effect::destroy().may_prompt());
    }
}
