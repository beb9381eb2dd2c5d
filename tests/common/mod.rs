//! Shared helpers for scenario tests.
//!
//! Games start with empty hands and a library of forests for each seat, so
//! nobody loses to an empty library while a scenario plays out. Cards a
//! scenario needs are put straight into hands or onto the battlefield.

#![allow(dead_code)]

use ccg_rules::cards::{CardDefinition, EffectSlot, Subtype};
use ccg_rules::core::{Action, PermanentId, PlayerId, RulesConfig};
use ccg_rules::effects::{CardFilter, Effect, TargetCount, TargetSpec};
use ccg_rules::game::{Game, GameBuilder};
use ccg_rules::mana::{ManaColor, ManaCost};
use ccg_rules::rules::Step;
use ccg_rules::zones::Zone;

pub const P0: PlayerId = PlayerId::new(0);
pub const P1: PlayerId = PlayerId::new(1);
pub const P2: PlayerId = PlayerId::new(2);

pub fn config(players: usize) -> RulesConfig {
    RulesConfig::default()
        .with_player_count(players)
        .with_opening_hand_size(0)
        .with_seed(42)
}

/// A started game with `players` seats.
pub fn game_with(players: usize) -> Game {
    let mut builder = GameBuilder::new().config(config(players));
    for seat in PlayerId::all(players) {
        builder = builder.deck(seat, vec![CardDefinition::basic_land(Subtype::Forest); 20]);
    }
    let mut game = builder.build().unwrap();
    game.start().unwrap();
    game
}

/// A two-player game in player 0's first precombat main phase.
pub fn main_phase() -> Game {
    let mut game = game_with(2);
    pass_until(&mut game, Step::PrecombatMain);
    game
}

/// Pass priority around until the game reaches `step`.
pub fn pass_until(game: &mut Game, step: Step) {
    for _ in 0..200 {
        if game.data().step() == step {
            return;
        }
        pass(game);
    }
    panic!("never reached {step}");
}

/// The current priority holder passes.
pub fn pass(game: &mut Game) {
    let holder = game.data().stack.priority_holder();
    game.apply(holder, Action::PassPriority).unwrap();
}

/// Every live player passes once, resolving the top of the stack.
pub fn resolve_top(game: &mut Game) {
    let live = game.data().live_players_apnap().count();
    for _ in 0..live {
        pass(game);
    }
}

/// Put a card in `player`'s hand and return its hand index.
pub fn in_hand(game: &mut Game, player: PlayerId, def: CardDefinition) -> usize {
    game.data_mut().add_card(player, Zone::Hand, def);
    game.data().player(player).hand.len() - 1
}

/// Put a permanent onto the battlefield, ready to attack or tap.
pub fn on_battlefield(game: &mut Game, player: PlayerId, def: CardDefinition) -> PermanentId {
    game.data_mut().add_permanent(player, def)
}

pub fn battlefield_index(game: &Game, id: PermanentId) -> usize {
    game.data().battlefield_index(id).unwrap()
}

pub fn add_mana(game: &mut Game, player: PlayerId, color: ManaColor, amount: u32) {
    game.data_mut().player_mut(player).mana_pool.add(color, amount);
}

pub fn life(game: &Game, player: PlayerId) -> i32 {
    game.data().player(player).life
}

// =============================================================================
// Cards
// =============================================================================

pub fn bears() -> CardDefinition {
    CardDefinition::creature("Grizzly Bears", ManaCost::new(2), 2, 2).with_subtypes(&[Subtype::Bear])
}

pub fn bolt() -> CardDefinition {
    CardDefinition::instant("Lightning Bolt", ManaCost::free())
        .with_target(TargetSpec::AnyTarget)
        .with_effect(EffectSlot::Spell, Effect::damage(3))
}

/// A free instant dealing `amount` damage to any target.
pub fn burn(name: &str, amount: i32) -> CardDefinition {
    CardDefinition::instant(name, ManaCost::free())
        .with_target(TargetSpec::AnyTarget)
        .with_effect(EffectSlot::Spell, Effect::damage(amount))
}

/// X target creature cards from your graveyard: exile them, then create a
/// 2/2 Zombie for each card exiled.
pub fn exhume() -> CardDefinition {
    let zombie = CardDefinition::creature("Zombie", ManaCost::free(), 2, 2);
    CardDefinition::sorcery("Exhume the Fallen", ManaCost::new(0).with_x())
        .with_target(TargetSpec::GraveyardCards {
            filter: CardFilter::Creature,
            count: TargetCount::X,
        })
        .with_effect(
            EffectSlot::Spell,
            Effect::ExileTargetsCreateTokens {
                token: Box::new(zombie),
            },
        )
}
