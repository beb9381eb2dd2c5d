//! Turn structure.
//!
//! A turn walks the fixed step sequence. [`advance_step`] is called once
//! every live player has passed with an empty stack; it performs the
//! turn-based actions of each step it enters and stops at the first step
//! where a player receives priority (or where a player must decide
//! something, such as the cleanup discard).
//!
//! The untap and cleanup steps never give priority. Combat damage steps
//! are skipped when no creature attacks, and the first-strike damage step
//! is skipped when no combatant has first strike or double strike.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tracing::debug;

use crate::cards::Keywords;
use crate::combat::{self, CombatProgress, CombatState};
use crate::continuous;
use crate::core::{GameData, GameResult, InvariantViolation, PlayerId};
use crate::effects::{shuffle_library, DamagePrevention};
use crate::interaction::{AwaitingInput, Prompt, Resume};
use crate::triggers::{self, GameEvent};

/// Steps of a turn, in order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "title_case")]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    PrecombatMain,
    BeginningOfCombat,
    DeclareAttackers,
    DeclareBlockers,
    FirstStrikeDamage,
    CombatDamage,
    EndOfCombat,
    PostcombatMain,
    End,
    Cleanup,
}

impl Step {
    #[must_use]
    pub fn is_main(self) -> bool {
        matches!(self, Step::PrecombatMain | Step::PostcombatMain)
    }

    #[must_use]
    pub fn is_combat(self) -> bool {
        matches!(
            self,
            Step::BeginningOfCombat
                | Step::DeclareAttackers
                | Step::DeclareBlockers
                | Step::FirstStrikeDamage
                | Step::CombatDamage
                | Step::EndOfCombat
        )
    }

    /// The following step. Cleanup wraps to the next turn's untap.
    #[must_use]
    pub fn next(self) -> Step {
        match self {
            Step::Untap => Step::Upkeep,
            Step::Upkeep => Step::Draw,
            Step::Draw => Step::PrecombatMain,
            Step::PrecombatMain => Step::BeginningOfCombat,
            Step::BeginningOfCombat => Step::DeclareAttackers,
            Step::DeclareAttackers => Step::DeclareBlockers,
            Step::DeclareBlockers => Step::FirstStrikeDamage,
            Step::FirstStrikeDamage => Step::CombatDamage,
            Step::CombatDamage => Step::EndOfCombat,
            Step::EndOfCombat => Step::PostcombatMain,
            Step::PostcombatMain => Step::End,
            Step::End => Step::Cleanup,
            Step::Cleanup => Step::Untap,
        }
    }
}

/// What entering a step led to.
enum StepEntry {
    /// The active player receives priority here.
    Priority,
    /// A player must answer a prompt first.
    Suspended,
    /// Nobody receives priority; move on.
    Continue,
}

/// Shuffle every library, draw opening hands and begin turn 1.
pub fn start_game(game: &mut GameData) -> GameResult<()> {
    let players: Vec<PlayerId> = game.players.player_ids().collect();
    for player in &players {
        shuffle_library(game, *player);
    }
    let hand_size = game.config.opening_hand_size;
    for player in &players {
        for _ in 0..hand_size {
            game.draw_card(*player);
        }
    }
    let first = game.turn.active_player;
    begin_turn(game, first, 1);
    game.turn.step = Step::Untap;
    advance_step(game)
}

/// Turn-based actions of the untap step for a new turn.
pub fn begin_turn(game: &mut GameData, active: PlayerId, number: u32) {
    game.turn.number = number;
    game.turn.active_player = active;
    game.combat = CombatState::default();

    let ids: Vec<_> = game.all_permanents().collect();
    for id in ids {
        if let Some(perm) = game.permanent_mut(id) {
            perm.ability_uses.clear();
            if perm.controller == active {
                perm.tapped = false;
                perm.summoning_sick = false;
            }
        }
    }
    for (_, state) in game.players.iter_mut() {
        state.lands_played_this_turn = 0;
    }
    game.log.push(format!("Turn {number} begins. {active}'s turn."));
    debug!(turn = number, %active, "turn began");
}

/// The live seat after `player`.
fn next_live_player(game: &GameData, player: PlayerId) -> PlayerId {
    let count = game.player_count();
    let mut seat = player.next(count);
    while seat != player {
        if !game.player(seat).has_lost {
            return seat;
        }
        seat = seat.next(count);
    }
    player
}

fn drain_mana_pools(game: &mut GameData) {
    for (_, state) in game.players.iter_mut() {
        state.mana_pool.drain();
    }
}

fn combatant_has_first_strike(game: &GameData) -> bool {
    game.combat
        .participants()
        .filter_map(|id| continuous::characteristics(game, id))
        .any(|c| c.keywords.intersects(Keywords::FIRST_STRIKE | Keywords::DOUBLE_STRIKE))
}

fn skips(game: &GameData, step: Step) -> bool {
    match step {
        Step::DeclareBlockers | Step::CombatDamage => game.combat.attackers.is_empty(),
        Step::FirstStrikeDamage => {
            game.combat.attackers.is_empty() || !combatant_has_first_strike(game)
        }
        _ => false,
    }
}

/// Move to the next step that gives priority or asks for input.
pub fn advance_step(game: &mut GameData) -> GameResult<()> {
    let mut next = game.turn.step.next();
    loop {
        if game.is_finished() {
            return Ok(());
        }
        drain_mana_pools(game);
        if skips(game, next) {
            debug!(step = %next, "step skipped");
            next = next.next();
            continue;
        }
        game.turn.step = next;
        debug!(step = %next, turn = game.turn.number, "step began");
        match enter_step(game, next)? {
            StepEntry::Priority => {
                game.stack.give_priority(game.turn.active_player);
                return Ok(());
            }
            StepEntry::Suspended => return Ok(()),
            StepEntry::Continue => next = next.next(),
        }
    }
}

fn enter_step(game: &mut GameData, step: Step) -> GameResult<StepEntry> {
    let active = game.turn.active_player;
    match step {
        Step::Untap => {
            // Only reached by wrapping around from cleanup.
            let next = next_live_player(game, active);
            let number = game.turn.number + 1;
            begin_turn(game, next, number);
            Ok(StepEntry::Continue)
        }
        Step::Upkeep | Step::End => {
            triggers::raise(game, &GameEvent::StepBegan { step, active })?;
            Ok(StepEntry::Priority)
        }
        Step::Draw => {
            let skip = game.turn.number == 1 && game.config.skip_first_draw;
            if !skip {
                if game.draw_card(active).is_some() {
                    game.log.push(format!("{active} draws a card."));
                } else {
                    game.log.push(format!("{active} cannot draw from an empty library."));
                }
            }
            Ok(StepEntry::Priority)
        }
        Step::BeginningOfCombat => {
            game.combat = CombatState::new(game.defending_player());
            Ok(StepEntry::Priority)
        }
        Step::FirstStrikeDamage | Step::CombatDamage => {
            let first_strike = step == Step::FirstStrikeDamage;
            match combat::resolve_combat_damage(game, first_strike)? {
                CombatProgress::Complete => Ok(StepEntry::Priority),
                CombatProgress::Suspended => Ok(StepEntry::Suspended),
            }
        }
        Step::PostcombatMain => {
            end_combat(game);
            Ok(StepEntry::Priority)
        }
        Step::Cleanup => enter_cleanup(game),
        Step::PrecombatMain | Step::DeclareAttackers | Step::DeclareBlockers | Step::EndOfCombat => {
            Ok(StepEntry::Priority)
        }
    }
}

/// Creatures stop attacking and blocking once combat is over.
fn end_combat(game: &mut GameData) {
    let ids: Vec<_> = game.combat.participants().collect();
    for id in ids {
        if let Some(perm) = game.permanent_mut(id) {
            perm.remove_from_combat();
        }
    }
    game.combat = CombatState::default();
}

fn enter_cleanup(game: &mut GameData) -> GameResult<StepEntry> {
    let active = game.turn.active_player;
    let excess = game
        .player(active)
        .hand
        .len()
        .saturating_sub(game.config.max_hand_size);
    if excess > 0 {
        let prompt = Prompt::Discard {
            remaining: excess as u32,
        };
        let input = AwaitingInput::new(game, active, prompt, Resume::Cleanup);
        game.awaiting = Some(input);
        return Ok(StepEntry::Suspended);
    }
    cleanup_effects(game)?;
    Ok(StepEntry::Continue)
}

/// Damage wears off and "until end of turn" effects end.
fn cleanup_effects(game: &mut GameData) -> Result<(), InvariantViolation> {
    let ids: Vec<_> = game.all_permanents().collect();
    for id in ids {
        if let Some(perm) = game.permanent_mut(id) {
            perm.clear_end_of_turn();
        }
    }
    for (_, state) in game.players.iter_mut() {
        state.prevention_shield = 0;
    }
    game.prevention = DamagePrevention::default();

    let reverting: Vec<_> = game
        .stolen
        .iter()
        .filter(|(_, stolen)| stolen.until_end_of_turn)
        .map(|(id, stolen)| (*id, stolen.original_controller))
        .collect();
    for (id, owner) in reverting {
        game.stolen.remove(&id);
        if game.is_on_battlefield(id) {
            game.change_controller(id, owner)?;
            let line = format!("Control of {} returns to {}.", game.permanent_name(id), owner);
            game.log.push(line);
        }
    }
    Ok(())
}

/// Finish a cleanup step that stopped for the hand-size discard.
pub fn finish_cleanup(game: &mut GameData) -> GameResult<()> {
    cleanup_effects(game)?;
    advance_step(game)
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::cards::{CardDefinition, Subtype};
    use crate::core::RulesConfig;
    use crate::mana::ManaCost;
    use crate::zones::Zone;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn started() -> GameData {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        for player in [P0, P1] {
            for _ in 0..20 {
                game.add_card(player, Zone::Library, CardDefinition::basic_land(Subtype::Forest));
            }
        }
        start_game(&mut game).unwrap();
        game
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::PrecombatMain.to_string(), "Precombat Main");
        assert_eq!(Step::FirstStrikeDamage.to_string(), "First Strike Damage");
    }

    #[test]
    fn test_step_cycle() {
        let steps: Vec<Step> = Step::iter().collect();
        for pair in steps.windows(2) {
            assert_eq!(pair[0].next(), pair[1]);
        }
        assert_eq!(Step::Cleanup.next(), Step::Untap);
    }

    #[test]
    fn test_start_game() {
        let game = started();
        assert_eq!(game.turn.number, 1);
        assert_eq!(game.step(), Step::Upkeep);
        assert_eq!(game.player(P0).hand.len(), 7);
        assert_eq!(game.player(P1).hand.len(), 7);
        assert_eq!(game.stack.priority_holder(), P0);
        assert!(game.log.contains("Turn 1 begins. Player 0's turn."));
    }

    #[test]
    fn test_first_draw_skipped() {
        let mut game = started();
        advance_step(&mut game).unwrap();
        assert_eq!(game.step(), Step::Draw);
        assert_eq!(game.player(P0).hand.len(), 7);
    }

    #[test]
    fn test_no_attackers_skips_damage_steps() {
        let mut game = started();
        while game.step() != Step::DeclareAttackers {
            advance_step(&mut game).unwrap();
        }
        advance_step(&mut game).unwrap();
        assert_eq!(game.step(), Step::EndOfCombat);
    }

    #[test]
    fn test_turn_passes_and_untaps() {
        let mut game = started();
        let bears = game.add_permanent(P1, CardDefinition::creature("Grizzly Bears", ManaCost::new(2), 2, 2));
        game.permanent_mut(bears).unwrap().tapped = true;
        game.permanent_mut(bears).unwrap().damage = 1;
        game.player_mut(P0).mana_pool.add(crate::mana::ManaColor::Green, 1);

        while game.step() != Step::End {
            advance_step(&mut game).unwrap();
        }
        assert_eq!(game.player(P0).mana_pool.total(), 0);
        advance_step(&mut game).unwrap();

        assert_eq!(game.turn.number, 2);
        assert_eq!(game.active_player(), P1);
        assert_eq!(game.step(), Step::Upkeep);
        let perm = game.permanent(bears).unwrap();
        assert!(!perm.tapped);
        assert_eq!(perm.damage, 0);
        assert!(game.log.contains("Turn 2 begins. Player 1's turn."));
    }

    #[test]
    fn test_cleanup_discard_prompt() {
        let mut game = started();
        for _ in 0..2 {
            game.add_card(P0, Zone::Hand, CardDefinition::basic_land(Subtype::Island));
        }
        while game.step() != Step::End {
            advance_step(&mut game).unwrap();
        }
        advance_step(&mut game).unwrap();
        assert_eq!(game.step(), Step::Cleanup);
        let awaiting = game.awaiting.as_ref().unwrap();
        assert_eq!(awaiting.player, P0);
        assert_eq!(awaiting.prompt, Prompt::Discard { remaining: 2 });
    }

    #[test]
    fn test_until_end_of_turn_control_reverts() {
        let mut game = started();
        let bears = game.add_permanent(P1, CardDefinition::creature("Grizzly Bears", ManaCost::new(2), 2, 2));
        game.change_controller(bears, P0).unwrap();
        game.stolen.insert(
            bears,
            crate::core::StolenCreature {
                original_controller: P1,
                source: None,
                enchantment_dependent: false,
                until_end_of_turn: true,
            },
        );
        while game.turn.number == 1 {
            advance_step(&mut game).unwrap();
        }
        assert_eq!(game.permanent(bears).unwrap().controller, P1);
        assert!(game.log.contains("Control of Grizzly Bears returns to Player 1."));
    }
}
