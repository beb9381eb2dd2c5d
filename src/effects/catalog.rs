//! External effect handlers.
//!
//! The engine ships a closed set of primitives. Anything else a card does
//! is registered here under a name and referenced from card data as
//! [`Effect::Custom`](super::Effect::Custom). Handlers run synchronously
//! and cannot suspend for player input.
//!
//! ```
//! use ccg_rules::effects::{EffectCatalog, ResolveContext};
//! use ccg_rules::core::{GameData, GameResult};
//!
//! let mut catalog = EffectCatalog::new();
//! catalog.register("double-life", |game: &mut GameData, ctx: &ResolveContext| -> GameResult<()> {
//!     game.player_mut(ctx.controller).life *= 2;
//!     Ok(())
//! });
//! assert!(catalog.contains("double-life"));
//! ```

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::resolver::ResolveContext;
use crate::core::{GameData, GameResult, InvariantViolation};

/// An effect implemented outside the engine.
pub trait EffectHandler: Send + Sync {
    fn execute(&self, game: &mut GameData, ctx: &ResolveContext) -> GameResult<()>;
}

impl<F> EffectHandler for F
where
    F: Fn(&mut GameData, &ResolveContext) -> GameResult<()> + Send + Sync,
{
    fn execute(&self, game: &mut GameData, ctx: &ResolveContext) -> GameResult<()> {
        self(game, ctx)
    }
}

/// Named effect handlers.
#[derive(Clone, Default)]
pub struct EffectCatalog {
    handlers: FxHashMap<String, Arc<dyn EffectHandler>>,
}

impl EffectCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, handler: impl EffectHandler + 'static) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Run the handler registered under `name`.
    pub fn execute(&self, name: &str, game: &mut GameData, ctx: &ResolveContext) -> GameResult<()> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| InvariantViolation::UnknownEffectHandler(name.to_string()))?;
        handler.execute(game, ctx)
    }
}

impl std::fmt::Debug for EffectCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("EffectCatalog").field("handlers", &names).finish()
    }
}
