//! Triggered abilities.
//!
//! Cards list their triggered effects in effect slots
//! ([`EffectSlot`](crate::cards::EffectSlot)). When something happens the
//! engine raises a [`GameEvent`]; [`collect_triggers`] reads the matching
//! slots off the cards involved.
//!
//! Most triggers are queued on the [`PriorityStack`](crate::stack::PriorityStack)
//! and put on the stack the next time a player would receive priority,
//! active player's first. Land-tap triggers resolve immediately instead.

mod event;
mod registry;

pub use event::GameEvent;
pub use registry::{collect_triggers, flush_triggers, raise, PendingTrigger};
