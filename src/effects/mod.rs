//! Effects: what spells and abilities do.
//!
//! - [`Effect`]: the closed set of composable primitives card data is
//!   built from.
//! - [`Target`], [`TargetSpec`]: what can be targeted and whether it
//!   still can be.
//! - [`run_effects`]: executes an effect list, suspending into an
//!   [`AwaitingInput`](crate::interaction::AwaitingInput) when a player
//!   must decide something.
//! - [`EffectCatalog`]: named handlers for effects defined outside the
//!   engine.

mod catalog;
mod damage;
mod effect;
mod resolver;
mod targeting;

pub use catalog::{EffectCatalog, EffectHandler};
pub use damage::{deal_damage, DamagePrevention, DamageRecipient, DamageSource};
pub use effect::{Amount, Effect, Recipient};
pub use resolver::{run_effects, Continuation, Finish, Resolution, ResolveContext};
pub use targeting::{
    describe, is_legal, legal_targets, validate_targets, CardFilter, PermanentFilter, Target,
    TargetCount, TargetSource, TargetSpec,
};

pub(crate) use resolver::{create_tokens, shuffle_library, target_names};
