//! # ccg-rules
//!
//! Rules-resolution core for a multiplayer collectible card game in the
//! classic stack-and-priority style.
//!
//! ## Design Principles
//!
//! 1. **Data-Driven Cards**: Cards are records built from a small closed
//!    set of effect primitives and static abilities. Anything outside that
//!    set goes through a named handler in the `EffectCatalog`.
//!
//! 2. **N-Player First**: Turn order, APNAP ordering and priority passes
//!    work for 2 to 8 seats.
//!
//! 3. **Nothing Derived Is Stored**: Effective power, toughness and
//!    keywords are computed from the battlefield on every query.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) cloning via `im-rs`. Every action
//!   runs against a checkpoint that is restored if the action is rejected.
//!
//! - **Ids, Not References**: Stack entries, auras and combat all refer to
//!   cards and permanents by id. A target that left the battlefield is a
//!   normal, checkable state.
//!
//! - **Resumable Prompts**: A resolution that needs a player decision
//!   stores an `AwaitingInput` and returns. Nothing blocks.
//!
//! ## Modules
//!
//! - `core`: Ids, players, configuration, RNG, actions, errors, game log, store
//! - `zones`: Zone moves and the battlefield
//! - `cards`: Card templates, types, keywords and permanents
//! - `mana`: Costs, pools and payment
//! - `effects`: Effect primitives, targeting and the resolver
//! - `continuous`: Static abilities and the layer system
//! - `rules`: Turn structure, state-based actions, game status
//! - `combat`: Attack and block declarations, combat damage
//! - `stack`: Casting, priority and resolution
//! - `triggers`: Game events and triggered abilities
//! - `interaction`: Player prompts and answers
//! - `game`: The `Game` facade, per-game handles and snapshots

pub mod core;
pub mod zones;
pub mod cards;
pub mod mana;
pub mod effects;
pub mod continuous;
pub mod rules;
pub mod combat;
pub mod stack;
pub mod triggers;
pub mod interaction;
pub mod game;

// Re-export commonly used types
pub use crate::core::{
    CardId, PermanentId, PlayerId, PlayerMap,
    GameRng, RulesConfig,
    Action, ActionRecord, BlockAssignment,
    GameData, GameLog,
    GameError, GameResult, RuleViolation, InvariantViolation, ConfigError,
};

pub use crate::zones::{Zone, ZonePosition};

pub use crate::cards::{Card, CardDefinition, CardType, Color, Keywords, Permanent, Subtype};

pub use crate::mana::{ManaCost, ManaPayment, ManaPool, StandardPayment};

pub use crate::effects::{Effect, EffectCatalog, EffectHandler, ResolveContext, Target, TargetSpec};

pub use crate::continuous::{Characteristics, StaticEffect};

pub use crate::rules::{GameOutcome, GameStatus, Step};

pub use crate::stack::{PriorityStack, StackEntry, StackEntryId};

pub use crate::interaction::{AwaitingInput, Choice, ChoiceKind, Prompt};

pub use crate::game::{Game, GameBuilder, GameHandle, GameSnapshot, Progress};
