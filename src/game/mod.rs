//! The public entry point: one [`Game`] per table.
//!
//! [`Game::apply`] takes one player action, runs it to completion and
//! reports where the game now stands. Every accepted action is followed
//! by a state-based action sweep and by putting any new triggers on the
//! stack. A rejected action leaves the game exactly as it was: the facade
//! keeps an O(1) checkpoint of [`GameData`] and restores it on any error.
//!
//! ```
//! use ccg_rules::cards::{CardDefinition, Subtype};
//! use ccg_rules::core::{Action, PlayerId, RulesConfig};
//! use ccg_rules::game::{GameBuilder, Progress};
//!
//! let forests = vec![CardDefinition::basic_land(Subtype::Forest); 10];
//! let mut game = GameBuilder::new()
//!     .config(RulesConfig::default().with_seed(3))
//!     .deck(PlayerId::new(0), forests.clone())
//!     .deck(PlayerId::new(1), forests)
//!     .build()
//!     .unwrap();
//! game.start().unwrap();
//! assert_eq!(game.progress(), Progress::Priority(PlayerId::new(0)));
//!
//! let progress = game.apply(PlayerId::new(0), Action::PassPriority).unwrap();
//! assert_eq!(progress, Progress::Priority(PlayerId::new(1)));
//! ```

mod handle;
mod snapshot;

use std::sync::Arc;

use tracing::{debug, error, warn};

pub use handle::GameHandle;
pub use snapshot::{GameSnapshot, SnapshotError};

use crate::cards::CardDefinition;
use crate::combat;
use crate::core::{
    Action, ActionRecord, ConfigError, GameData, GameError, GameResult, PlayerId, RuleViolation,
    RulesConfig,
};
use crate::effects::EffectCatalog;
use crate::interaction::{self, ChoiceKind};
use crate::mana::{ManaPayment, StandardPayment};
use crate::rules::{self, GameOutcome};
use crate::stack::casting;
use crate::triggers;
use crate::zones::Zone;

/// Where the game stands after an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// Waiting for the given player to act or pass.
    Priority(PlayerId),
    /// Waiting for the given player to answer a prompt.
    AwaitingInput { player: PlayerId, kind: ChoiceKind },
    Finished(GameOutcome),
}

/// Builder for a [`Game`].
pub struct GameBuilder {
    config: RulesConfig,
    catalog: EffectCatalog,
    payment: Arc<dyn ManaPayment>,
    decks: Vec<(PlayerId, Vec<CardDefinition>)>,
}

impl Default for GameBuilder {
    fn default() -> Self {
        Self {
            config: RulesConfig::default(),
            catalog: EffectCatalog::new(),
            payment: Arc::new(StandardPayment),
            decks: Vec::new(),
        }
    }
}

impl GameBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: RulesConfig) -> Self {
        self.config = config;
        self
    }

    /// Handlers for `Effect::Custom` effects.
    #[must_use]
    pub fn catalog(mut self, catalog: EffectCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub fn payment(mut self, payment: impl ManaPayment + 'static) -> Self {
        self.payment = Arc::new(payment);
        self
    }

    /// Library contents for `player`, top card first.
    #[must_use]
    pub fn deck(mut self, player: PlayerId, cards: Vec<CardDefinition>) -> Self {
        self.decks.push((player, cards));
        self
    }

    /// Create the game. Libraries are filled but not yet shuffled; call
    /// [`Game::start`] to shuffle, draw and begin the first turn.
    pub fn build(self) -> Result<Game, ConfigError> {
        let mut data = GameData::new(self.config)?;
        for (player, cards) in self.decks {
            if !data.players.contains(player) {
                return Err(ConfigError::NoSuchSeat(player));
            }
            for card in cards.into_iter().rev() {
                data.add_card(player, Zone::Library, card);
            }
        }
        Ok(Game {
            data,
            catalog: self.catalog,
            payment: self.payment,
        })
    }
}

/// A game in progress.
pub struct Game {
    data: GameData,
    catalog: EffectCatalog,
    payment: Arc<dyn ManaPayment>,
}

impl Game {
    /// An empty game with the standard payer and no custom effects.
    pub fn new(config: RulesConfig) -> Result<Self, ConfigError> {
        GameBuilder::new().config(config).build()
    }

    #[must_use]
    pub fn builder() -> GameBuilder {
        GameBuilder::new()
    }

    #[must_use]
    pub fn data(&self) -> &GameData {
        &self.data
    }

    /// Direct access to the store, for setting up positions.
    pub fn data_mut(&mut self) -> &mut GameData {
        &mut self.data
    }

    #[must_use]
    pub fn catalog(&self) -> &EffectCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.data.is_finished()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.data.status.outcome()
    }

    /// Shuffle, draw opening hands and begin turn 1.
    pub fn start(&mut self) -> GameResult<Progress> {
        let checkpoint = self.data.clone();
        let result = rules::start_game(&mut self.data).and_then(|()| self.settle());
        if let Err(err) = result {
            self.data = checkpoint;
            report(None, "start", &err);
            return Err(err);
        }
        Ok(self.progress())
    }

    /// Apply one action from `player`.
    pub fn apply(&mut self, player: PlayerId, action: Action) -> GameResult<Progress> {
        let label = action.label();
        if let Err(err) = self.admit(&action) {
            report(Some(player), label, &err);
            return Err(err);
        }
        let checkpoint = self.data.clone();
        let result = self.dispatch(player, &action).and_then(|()| self.settle());
        match result {
            Ok(()) => {
                let turn = self.data.turn.number;
                self.data.history.push_back(ActionRecord::new(player, turn, action));
                debug!(%player, action = label, "action applied");
                Ok(self.progress())
            }
            Err(err) => {
                self.data = checkpoint;
                report(Some(player), label, &err);
                Err(err)
            }
        }
    }

    /// Who the game is waiting on.
    #[must_use]
    pub fn progress(&self) -> Progress {
        if let Some(outcome) = self.data.status.outcome() {
            return Progress::Finished(outcome);
        }
        if let Some(awaiting) = &self.data.awaiting {
            return Progress::AwaitingInput {
                player: awaiting.player,
                kind: awaiting.kind(),
            };
        }
        Progress::Priority(self.data.stack.priority_holder())
    }

    /// A snapshot for connected clients.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.data)
    }

    /// Actions that cannot be considered at all right now.
    fn admit(&self, action: &Action) -> GameResult<()> {
        if self.data.is_finished() {
            return Err(RuleViolation::GameFinished.into());
        }
        if let Some(awaiting) = &self.data.awaiting {
            if !matches!(action, Action::SubmitChoice(_)) {
                return Err(RuleViolation::InputPending {
                    player: awaiting.player,
                    kind: awaiting.kind(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, player: PlayerId, action: &Action) -> GameResult<()> {
        let game = &mut self.data;
        let payment = self.payment.as_ref();
        match action {
            Action::PlayLand { hand_index } => casting::play_land(game, player, *hand_index),
            Action::TapLand { index } => casting::tap_land(game, &self.catalog, player, *index),
            Action::CastSpell {
                hand_index,
                x_value,
                targets,
            } => casting::cast_spell(game, payment, player, *hand_index, *x_value, targets),
            Action::ActivateAbility {
                index,
                ability,
                x_value,
                targets,
            } => casting::activate_ability(game, payment, player, *index, *ability, *x_value, targets),
            Action::PassPriority => casting::pass_priority(game, &self.catalog, player),
            Action::DeclareAttackers { indices } => combat::declare_attackers(game, player, indices),
            Action::DeclareBlockers { assignments } => combat::declare_blockers(game, player, assignments),
            Action::SubmitChoice(choice) => {
                interaction::submit_choice(game, &self.catalog, payment, player, choice.clone())
            }
        }
    }

    /// Sweep state-based actions, apply the legend rule, then put waiting
    /// triggers on the stack, until none has anything left to do.
    fn settle(&mut self) -> GameResult<()> {
        loop {
            rules::run_state_based_actions(&mut self.data)?;
            if self.data.is_finished() || self.data.awaiting.is_some() {
                return Ok(());
            }
            if rules::check_legend_rule(&mut self.data) {
                return Ok(());
            }
            if !self.data.stack.has_pending_triggers() {
                return Ok(());
            }
            let pushed = triggers::flush_triggers(&mut self.data);
            let active = self.data.active_player();
            self.data.stack.give_priority(active);
            debug!(pushed, "triggers put on the stack");
        }
    }
}

fn report(player: Option<PlayerId>, action: &str, err: &GameError) {
    if err.is_fatal() {
        error!(?player, action, error = %err, "engine invariant violated");
    } else {
        warn!(?player, action, error = %err, "action rejected");
    }
}
