//! The game-state store.
//!
//! [`GameData`] is the aggregate root: every other component reads and
//! mutates the game only through it. It owns
//!
//! - per-player zones (hand, library, graveyard, exile, battlefield order),
//!   life totals and mana pools,
//! - the card arena ([`CardRegistry`]) and the permanent arena,
//! - the stack, turn state and combat state,
//! - at most one pending [`AwaitingInput`],
//! - the stolen-creature side table,
//! - the game log, action history and status.
//!
//! All collections are `im` persistent structures, so cloning a `GameData`
//! is O(1). The facade relies on this to restore a checkpoint when an
//! action is rejected.
//!
//! Nothing derived is stored here. Effective power, toughness, keywords and
//! creature-ness are recomputed by [`crate::continuous`] on every query.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use super::action::ActionRecord;
use super::config::RulesConfig;
use super::entity::{CardId, IdAllocator, PermanentId};
use super::error::{ConfigError, InvariantViolation};
use super::log::GameLog;
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use crate::cards::{Card, CardDefinition, CardRegistry, Permanent};
use crate::combat::CombatState;
use crate::effects::DamagePrevention;
use crate::interaction::AwaitingInput;
use crate::mana::ManaPool;
use crate::rules::{GameStatus, Step};
use crate::stack::PriorityStack;

/// Everything one player owns outside the shared arenas.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlayerState {
    pub life: i32,
    pub hand: Vector<CardId>,
    /// Index 0 is the top of the library.
    pub library: Vector<CardId>,
    pub graveyard: Vector<CardId>,
    pub exile: Vector<CardId>,
    /// Permanents this player controls, in the order they arrived.
    pub battlefield: Vector<PermanentId>,
    pub mana_pool: ManaPool,
    pub lands_played_this_turn: u32,
    pub drew_from_empty_library: bool,
    pub has_lost: bool,
    /// The next this-much damage to this player is prevented.
    pub prevention_shield: i32,
}

/// Turn number, active player and current step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Starts at 1.
    pub number: u32,
    pub active_player: PlayerId,
    pub step: Step,
}

/// Control-change bookkeeping for one stolen permanent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StolenCreature {
    /// Who controlled it before the steal.
    pub original_controller: PlayerId,
    /// The permanent whose effect grants control, if any.
    pub source: Option<PermanentId>,
    /// Control lasts only while `source` is attached to the stolen permanent.
    pub enchantment_dependent: bool,
    /// Control reverts in the cleanup step.
    pub until_end_of_turn: bool,
}

/// Aggregate root of one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameData {
    pub config: RulesConfig,
    pub players: PlayerMap<PlayerState>,
    pub cards: CardRegistry,
    pub permanents: OrdMap<PermanentId, Permanent>,
    pub stack: PriorityStack,
    pub turn: TurnState,
    pub combat: CombatState,
    pub awaiting: Option<AwaitingInput>,
    /// Stolen permanent -> how and from whom it was taken.
    pub stolen: OrdMap<PermanentId, StolenCreature>,
    pub prevention: DamagePrevention,
    pub log: GameLog,
    pub history: Vector<ActionRecord>,
    pub status: GameStatus,
    pub rng: GameRng,
    pub ids: IdAllocator,
}

impl GameData {
    /// Create an empty game: no cards anywhere, turn 1 upkeep, seat 0 active.
    pub fn new(config: RulesConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let life = config.starting_life;
        let player_count = config.player_count;
        let first = PlayerId::new(0);

        Ok(Self {
            players: PlayerMap::new(player_count, |_| PlayerState {
                life,
                ..PlayerState::default()
            }),
            cards: CardRegistry::new(),
            permanents: OrdMap::new(),
            stack: PriorityStack::new(player_count, first),
            turn: TurnState {
                number: 1,
                active_player: first,
                step: Step::Upkeep,
            },
            combat: CombatState::default(),
            awaiting: None,
            stolen: OrdMap::new(),
            prevention: DamagePrevention::default(),
            log: GameLog::new(),
            history: Vector::new(),
            status: GameStatus::InProgress,
            rng: GameRng::new(config.seed),
            ids: IdAllocator::default(),
            config,
        })
    }

    // === Players ===

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player]
    }

    pub fn player_mut(&mut self, player: PlayerId) -> &mut PlayerState {
        &mut self.players[player]
    }

    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.turn.active_player
    }

    /// Players still in the game, in APNAP order.
    pub fn live_players_apnap(&self) -> impl Iterator<Item = PlayerId> + '_ {
        PlayerId::apnap(self.turn.active_player, self.player_count())
            .filter(move |p| !self.players[*p].has_lost)
    }

    /// Opponents of `player` that are still in the game.
    pub fn opponents(&self, player: PlayerId) -> impl Iterator<Item = PlayerId> + '_ {
        self.players
            .iter()
            .filter(move |(id, state)| *id != player && !state.has_lost)
            .map(|(id, _)| id)
    }

    /// The defending player for the active player's attacks.
    ///
    /// Two-player combat: the next live seat after the active player.
    #[must_use]
    pub fn defending_player(&self) -> PlayerId {
        let active = self.turn.active_player;
        let count = self.player_count();
        let mut seat = active.next(count);
        while seat != active {
            if !self.players[seat].has_lost {
                return seat;
            }
            seat = seat.next(count);
        }
        active
    }

    // === Cards ===

    /// Look up a card. Missing ids are an engine bug.
    pub fn card(&self, id: CardId) -> Result<&Card, InvariantViolation> {
        self.cards.get(id).ok_or(InvariantViolation::MissingCard(id))
    }

    /// Display name of a card, or its id when it no longer exists.
    #[must_use]
    pub fn card_name(&self, id: CardId) -> String {
        self.cards
            .get(id)
            .map_or_else(|| id.to_string(), |card| card.name().to_string())
    }

    /// Register a new card owned by `owner`. It is in no zone yet.
    pub fn create_card(&mut self, definition: CardDefinition, owner: PlayerId) -> CardId {
        let id = self.ids.next_card();
        self.cards.insert(Card::new(id, owner, definition));
        id
    }

    /// Register a token owned by `owner`. It is in no zone yet.
    pub fn create_token(&mut self, definition: CardDefinition, owner: PlayerId) -> CardId {
        let id = self.ids.next_card();
        self.cards.insert(Card::token(id, owner, definition));
        id
    }

    // === Permanents ===

    #[must_use]
    pub fn permanent(&self, id: PermanentId) -> Option<&Permanent> {
        self.permanents.get(&id)
    }

    pub fn permanent_mut(&mut self, id: PermanentId) -> Option<&mut Permanent> {
        self.permanents.get_mut(&id)
    }

    /// The card a permanent represents.
    pub fn permanent_card(&self, id: PermanentId) -> Result<&Card, InvariantViolation> {
        let permanent = self
            .permanents
            .get(&id)
            .ok_or(InvariantViolation::MissingPermanent(id))?;
        self.card(permanent.card)
    }

    /// Display name of a permanent, or its id when it is gone.
    #[must_use]
    pub fn permanent_name(&self, id: PermanentId) -> String {
        self.permanents
            .get(&id)
            .map_or_else(|| id.to_string(), |p| self.card_name(p.card))
    }

    #[must_use]
    pub fn is_on_battlefield(&self, id: PermanentId) -> bool {
        self.permanents.contains_key(&id)
    }

    /// Permanent at `index` of `player`'s battlefield.
    #[must_use]
    pub fn battlefield_at(&self, player: PlayerId, index: usize) -> Option<PermanentId> {
        self.players[player].battlefield.get(index).copied()
    }

    /// Every permanent, seat by seat, each battlefield in arrival order.
    pub fn all_permanents(&self) -> impl Iterator<Item = PermanentId> + '_ {
        self.players
            .iter()
            .flat_map(|(_, state)| state.battlefield.iter().copied())
    }

    /// Every permanent, walking seats in APNAP order.
    #[must_use]
    pub fn permanents_apnap(&self) -> Vec<PermanentId> {
        PlayerId::apnap(self.turn.active_player, self.player_count())
            .flat_map(|p| self.players[p].battlefield.iter().copied())
            .collect()
    }

    // === Status ===

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// Current step.
    #[must_use]
    pub fn step(&self) -> Step {
        self.turn.step
    }

    /// Whether the active player could take a sorcery-speed action now.
    #[must_use]
    pub fn is_sorcery_timing(&self, player: PlayerId) -> bool {
        player == self.turn.active_player && self.turn.step.is_main() && self.stack.is_empty()
    }
}
