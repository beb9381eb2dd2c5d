//! Error types.
//!
//! Two failure classes leave the engine:
//!
//! - [`RuleViolation`]: the submitted action is not legal right now. The
//!   game state is untouched and the caller may try something else.
//! - [`InvariantViolation`]: the engine or its caller broke a contract
//!   (for example, a choice submitted while nothing is pending). These are
//!   programming errors and are always logged at `error` level.
//!
//! Fizzles and game-ending SBAs are ordinary outcomes and never surface here.

use thiserror::Error;

use super::{CardId, PermanentId, PlayerId};
use crate::interaction::ChoiceKind;
use crate::rules::Step;

/// An action rejected by the rules.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("the game is already finished")]
    GameFinished,

    #[error("{0} does not hold priority")]
    NotPriorityHolder(PlayerId),

    #[error("{player} must first answer the pending {kind} prompt")]
    InputPending { player: PlayerId, kind: ChoiceKind },

    #[error("{0} is not the player being prompted")]
    WrongPlayer(PlayerId),

    #[error("no card at hand index {0}")]
    NoSuchHandCard(usize),

    #[error("no permanent at battlefield index {0}")]
    NoSuchBattlefieldIndex(usize),

    #[error("{0} is not on the battlefield")]
    NoSuchPermanent(PermanentId),

    #[error("{0} is not where it is expected to be")]
    NoSuchCard(CardId),

    #[error("{player} does not control {name}")]
    NotController { player: PlayerId, name: String },

    #[error("{0} can only be cast at sorcery speed")]
    SorcerySpeed(String),

    #[error("not allowed during the {0} step")]
    WrongStep(Step),

    #[error("lands cannot be cast, they are played")]
    LandNotCastable,

    #[error("{0} is not a land")]
    NotALand(String),

    #[error("a land was already played this turn")]
    LandAlreadyPlayed,

    #[error("insufficient mana to pay {0}")]
    InsufficientMana(String),

    #[error("X = {0} is out of range")]
    XOutOfRange(u32),

    #[error("illegal target: {0}")]
    IllegalTarget(String),

    #[error("{0} is already tapped")]
    AlreadyTapped(String),

    #[error("{0} has summoning sickness")]
    SummoningSick(String),

    #[error("{name} has no activated ability {index}")]
    NoSuchAbility { name: String, index: usize },

    #[error("{0} has reached its activation limit this turn")]
    ActivationLimit(String),

    #[error("illegal attack: {0}")]
    IllegalAttack(String),

    #[error("illegal block: {0}")]
    IllegalBlock(String),

    #[error("invalid choice: {0}")]
    InvalidChoice(String),
}

/// A broken engine contract.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("a choice was submitted but no input is pending")]
    NoPendingInput,

    #[error("state-based actions did not reach a fixpoint within {0} sweeps")]
    SbaDidNotConverge(usize),

    #[error("no effect handler registered under {0:?}")]
    UnknownEffectHandler(String),

    #[error("{0} is referenced but missing from the card registry")]
    MissingCard(CardId),

    #[error("{0} is referenced but missing from the battlefield arena")]
    MissingPermanent(PermanentId),

    #[error("the game lock was poisoned by a panicking caller")]
    PoisonedLock,
}

/// Any failure returned by the public API.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Rule(#[from] RuleViolation),

    #[error("engine invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl GameError {
    /// Invariant violations are fatal for the game instance.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::Invariant(_))
    }

    /// The rule violation, if this is one.
    #[must_use]
    pub fn as_rule(&self) -> Option<&RuleViolation> {
        match self {
            GameError::Rule(rule) => Some(rule),
            GameError::Invariant(_) => None,
        }
    }
}

/// Rejected [`RulesConfig`](super::RulesConfig).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("player count must be between 2 and 8, got {0}")]
    PlayerCount(usize),

    #[error("starting life must be positive, got {0}")]
    StartingLife(i32),

    #[error("a creature must be able to block at least one attacker")]
    BlocksPerCreature,

    #[error("the SBA sweep limit must be at least 1")]
    SweepLimit,

    #[error("a deck was given for {0}, but the game has no such seat")]
    NoSuchSeat(PlayerId),
}

pub type GameResult<T> = Result<T, GameError>;
