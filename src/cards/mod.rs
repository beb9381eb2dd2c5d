//! Cards and permanents.
//!
//! - [`CardDefinition`]: immutable printed data, built in code.
//! - [`Card`]: one physical copy or token, with an owner and a stable id.
//! - [`Permanent`]: the battlefield incarnation of a card, with all of its
//!   mutable state.
//! - [`CardRegistry`]: the id-indexed arena of every card in a game.

pub mod types;
pub mod definition;
pub mod permanent;
pub mod registry;

pub use types::{CardType, Color, Keywords, Subtype};
pub use definition::{ActivatedAbility, Card, CardDefinition, EffectSlot};
pub use permanent::Permanent;
pub use registry::CardRegistry;
