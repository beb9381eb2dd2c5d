//! State-based actions.
//!
//! Checked whenever a player would receive priority. Each sweep looks at
//! the whole game, collects every action whose condition holds, and
//! applies them all; sweeps repeat until one finds nothing. Actions never
//! use the stack and never ask a player anything.
//!
//! Within a sweep actions are applied in a fixed order: player losses,
//! creature deaths (or regeneration), auras and equipment falling off,
//! then control reverting. Every action in a sweep concerns a different
//! object, and everything is decided from the state at the start of the
//! sweep, so the order is not observable.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::{GameOutcome, GameStatus};
use crate::cards::Subtype;
use crate::continuous;
use crate::core::{GameData, InvariantViolation, PermanentId, PlayerId};
use crate::effects::TargetSpec;
use crate::zones::Zone;

/// Why a player lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoseReason {
    ZeroLife,
    DrewFromEmptyLibrary,
}

impl std::fmt::Display for LoseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoseReason::ZeroLife => write!(f, "life total is 0 or less"),
            LoseReason::DrewFromEmptyLibrary => write!(f, "drew from an empty library"),
        }
    }
}

/// A state-based action that needs to be performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateBasedAction {
    PlayerLoses { player: PlayerId, reason: LoseReason },
    /// Damage marked is at least its toughness.
    LethalDamage(PermanentId),
    /// Toughness 0 or less.
    ZeroToughness(PermanentId),
    /// An aura attached to nothing or to something it can't enchant.
    AuraFallsOff(PermanentId),
    /// Equipment attached to something that is gone or not a creature.
    EquipmentFallsOff(PermanentId),
    /// A creature stolen by an aura whose aura is no longer on it.
    ControlReverts { permanent: PermanentId, to: PlayerId },
}

fn check_players(game: &GameData, actions: &mut Vec<StateBasedAction>) {
    for (player, state) in game.players.iter() {
        if state.has_lost {
            continue;
        }
        if state.life <= 0 {
            actions.push(StateBasedAction::PlayerLoses {
                player,
                reason: LoseReason::ZeroLife,
            });
        } else if state.drew_from_empty_library {
            actions.push(StateBasedAction::PlayerLoses {
                player,
                reason: LoseReason::DrewFromEmptyLibrary,
            });
        }
    }
}

fn check_creatures(game: &GameData, actions: &mut Vec<StateBasedAction>) {
    for id in game.all_permanents() {
        let Some(c) = continuous::characteristics(game, id) else {
            continue;
        };
        if !c.is_creature() {
            continue;
        }
        let toughness = c.toughness.unwrap_or(0);
        let damage = game.permanent(id).map_or(0, |p| p.damage);
        if toughness <= 0 {
            actions.push(StateBasedAction::ZeroToughness(id));
        } else if damage >= toughness {
            actions.push(StateBasedAction::LethalDamage(id));
        }
    }
}

/// Whether an aura may stay on what it is attached to.
fn aura_is_legal(game: &GameData, aura: PermanentId) -> bool {
    let Some(perm) = game.permanent(aura) else {
        return false;
    };
    let Some(host) = perm.attached_to else {
        return false;
    };
    let Ok(card) = game.card(perm.card) else {
        return false;
    };
    if !game.is_on_battlefield(host) {
        return false;
    }
    if continuous::has_protection_from(game, host, card.def.color) {
        return false;
    }
    match &card.def.target {
        TargetSpec::Permanent(filter) => filter.matches(game, host),
        TargetSpec::OwnPermanent(filter) => {
            filter.matches(game, host) && continuous::controller_of(game, host) == Some(perm.controller)
        }
        TargetSpec::AnyTarget => continuous::is_creature(game, host),
        _ => true,
    }
}

fn check_attachments(game: &GameData, actions: &mut Vec<StateBasedAction>) {
    for id in game.all_permanents() {
        let Some(perm) = game.permanent(id) else {
            continue;
        };
        let Ok(card) = game.card(perm.card) else {
            continue;
        };
        if card.def.is_aura() {
            if !aura_is_legal(game, id) {
                actions.push(StateBasedAction::AuraFallsOff(id));
            }
        } else if card.def.has_subtype(Subtype::Equipment) {
            if let Some(host) = perm.attached_to {
                if !continuous::is_creature(game, host) {
                    actions.push(StateBasedAction::EquipmentFallsOff(id));
                }
            }
        }
    }
}

fn check_stolen(game: &GameData, actions: &mut Vec<StateBasedAction>) {
    for (id, stolen) in game.stolen.iter() {
        if !stolen.enchantment_dependent {
            continue;
        }
        let still_attached = stolen.source.is_some_and(|source| {
            game.permanent(source)
                .is_some_and(|aura| aura.attached_to == Some(*id))
        });
        if !still_attached && game.is_on_battlefield(*id) {
            actions.push(StateBasedAction::ControlReverts {
                permanent: *id,
                to: stolen.original_controller,
            });
        }
    }
}

/// Collect every state-based action that currently applies.
#[must_use]
pub fn check_state_based_actions(game: &GameData) -> Vec<StateBasedAction> {
    let mut actions = Vec::new();
    check_players(game, &mut actions);
    check_creatures(game, &mut actions);
    check_attachments(game, &mut actions);
    check_stolen(game, &mut actions);
    actions
}

/// Destroy a permanent, unless a regeneration shield replaces it.
///
/// Returns `true` if it actually left the battlefield.
pub fn destroy_permanent(
    game: &mut GameData,
    id: PermanentId,
    can_regenerate: bool,
) -> Result<bool, InvariantViolation> {
    let name = game.permanent_name(id);
    let Some(perm) = game.permanent_mut(id) else {
        return Ok(false);
    };
    if can_regenerate && perm.regenerate() {
        game.combat.forget(id);
        game.log.push(format!("{name} regenerates."));
        return Ok(false);
    }
    game.remove_permanent(id, Zone::Graveyard)?;
    game.log.push(format!("{name} is destroyed."));
    Ok(true)
}

fn put_into_graveyard(game: &mut GameData, id: PermanentId) -> Result<(), InvariantViolation> {
    if !game.is_on_battlefield(id) {
        return Ok(());
    }
    let name = game.permanent_name(id);
    game.remove_permanent(id, Zone::Graveyard)?;
    game.log.push(format!("{name} is put into its owner's graveyard."));
    Ok(())
}

fn order(action: &StateBasedAction) -> u8 {
    match action {
        StateBasedAction::PlayerLoses { .. } => 0,
        StateBasedAction::LethalDamage(_) | StateBasedAction::ZeroToughness(_) => 1,
        StateBasedAction::AuraFallsOff(_) | StateBasedAction::EquipmentFallsOff(_) => 2,
        StateBasedAction::ControlReverts { .. } => 3,
    }
}

/// Apply one sweep's worth of actions.
pub fn apply_state_based_actions(
    game: &mut GameData,
    mut actions: Vec<StateBasedAction>,
) -> Result<(), InvariantViolation> {
    actions.sort_by_key(order);
    for action in actions {
        match action {
            StateBasedAction::PlayerLoses { player, reason } => {
                game.player_mut(player).has_lost = true;
                game.log.push(format!("{player} loses the game ({reason})."));
            }
            StateBasedAction::LethalDamage(id) | StateBasedAction::ZeroToughness(id) => {
                destroy_permanent(game, id, true)?;
            }
            StateBasedAction::AuraFallsOff(id) | StateBasedAction::EquipmentFallsOff(id) => {
                put_into_graveyard(game, id)?;
            }
            StateBasedAction::ControlReverts { permanent, to } => {
                if !game.is_on_battlefield(permanent) {
                    continue;
                }
                game.stolen.remove(&permanent);
                game.change_controller(permanent, to)?;
                let line = format!("Control of {} returns to {}.", game.permanent_name(permanent), to);
                game.log.push(line);
            }
        }
    }
    check_game_end(game);
    Ok(())
}

/// Finish the game when at most one player remains.
fn check_game_end(game: &mut GameData) {
    if game.is_finished() {
        return;
    }
    let remaining: Vec<PlayerId> = game
        .players
        .iter()
        .filter(|(_, state)| !state.has_lost)
        .map(|(id, _)| id)
        .collect();
    match remaining.as_slice() {
        [winner] => {
            game.log.push(format!("{winner} wins the game."));
            game.status = GameStatus::Finished(GameOutcome::Winner(*winner));
        }
        [] => {
            game.log.push("The game is a draw.");
            game.status = GameStatus::Finished(GameOutcome::Draw);
        }
        _ => {}
    }
}

/// Sweep until nothing applies. Returns the number of sweeps that applied
/// something.
pub fn run_state_based_actions(game: &mut GameData) -> Result<usize, InvariantViolation> {
    let limit = game.config.sba_sweep_limit;
    for sweep in 0..limit {
        if game.is_finished() {
            return Ok(sweep);
        }
        let actions = check_state_based_actions(game);
        if actions.is_empty() {
            return Ok(sweep);
        }
        debug!(sweep, count = actions.len(), "applying state-based actions");
        apply_state_based_actions(game, actions)?;
    }
    Err(InvariantViolation::SbaDidNotConverge(limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, Keywords};
    use crate::continuous::{Scope, StaticEffect};
    use crate::core::{RulesConfig, StolenCreature};
    use crate::effects::PermanentFilter;
    use crate::mana::ManaCost;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn game() -> GameData {
        GameData::new(RulesConfig::default()).unwrap()
    }

    fn bears() -> CardDefinition {
        CardDefinition::creature("Grizzly Bears", ManaCost::new(1), 2, 2)
    }

    #[test]
    fn test_lethal_damage_destroys() {
        let mut game = game();
        let id = game.add_permanent(P0, bears());
        game.permanent_mut(id).unwrap().damage = 2;

        assert_eq!(check_state_based_actions(&game), vec![StateBasedAction::LethalDamage(id)]);
        assert_eq!(run_state_based_actions(&mut game).unwrap(), 1);
        assert!(!game.is_on_battlefield(id));
        assert_eq!(game.player(P0).graveyard.len(), 1);
        assert!(game.log.contains("Grizzly Bears is destroyed."));
    }

    #[test]
    fn test_regeneration_consumes_one_shield() {
        let mut game = game();
        let id = game.add_permanent(P0, bears());
        {
            let perm = game.permanent_mut(id).unwrap();
            perm.damage = 3;
            perm.regeneration_shields = 2;
            perm.attacking = true;
        }
        run_state_based_actions(&mut game).unwrap();

        let perm = game.permanent(id).unwrap();
        assert_eq!(perm.regeneration_shields, 1);
        assert!(perm.tapped);
        assert!(!perm.attacking);
        assert_eq!(perm.damage, 0);
    }

    #[test]
    fn test_chain_in_one_call() {
        let mut game = game();
        let lord = game.add_permanent(
            P0,
            CardDefinition::creature("Lord", ManaCost::new(2), 1, 1).with_static(StaticEffect::Boost {
                power: 0,
                toughness: 1,
                scope: Scope::OtherOwnCreatures,
            }),
        );
        let bears = game.add_permanent(P0, bears());
        game.permanent_mut(lord).unwrap().damage = 1;
        game.permanent_mut(bears).unwrap().damage = 2;

        // Bears survive at 2/3 until the lord dies.
        assert_eq!(check_state_based_actions(&game), vec![StateBasedAction::LethalDamage(lord)]);
        assert_eq!(run_state_based_actions(&mut game).unwrap(), 2);
        assert!(!game.is_on_battlefield(lord));
        assert!(!game.is_on_battlefield(bears));
    }

    #[test]
    fn test_zero_toughness() {
        let mut game = game();
        let id = game.add_permanent(P1, bears());
        game.permanent_mut(id).unwrap().toughness_modifier = -2;
        assert_eq!(check_state_based_actions(&game), vec![StateBasedAction::ZeroToughness(id)]);
        run_state_based_actions(&mut game).unwrap();
        assert!(!game.is_on_battlefield(id));
    }

    #[test]
    fn test_player_loses_and_game_ends() {
        let mut game = game();
        game.player_mut(P1).life = 0;
        run_state_based_actions(&mut game).unwrap();
        assert!(game.player(P1).has_lost);
        assert_eq!(game.status, GameStatus::Finished(GameOutcome::Winner(P0)));
        assert!(game.log.contains("Player 0 wins the game."));
    }

    #[test]
    fn test_simultaneous_losses_draw() {
        let mut game = game();
        game.player_mut(P0).life = -1;
        game.player_mut(P1).drew_from_empty_library = true;
        run_state_based_actions(&mut game).unwrap();
        assert_eq!(game.status, GameStatus::Finished(GameOutcome::Draw));
    }

    #[test]
    fn test_orphaned_aura_and_control_revert() {
        let mut game = game();
        let bears = game.add_permanent(P1, bears());
        let aura = game.add_permanent(
            P0,
            CardDefinition::aura("Persuasion", ManaCost::new(3), TargetSpec::Permanent(PermanentFilter::Creature))
                .with_static(StaticEffect::ControlEnchanted),
        );
        game.permanent_mut(aura).unwrap().attached_to = Some(bears);
        game.change_controller(bears, P0).unwrap();
        game.stolen.insert(
            bears,
            StolenCreature {
                original_controller: P1,
                source: Some(aura),
                enchantment_dependent: true,
                until_end_of_turn: false,
            },
        );
        assert!(check_state_based_actions(&game).is_empty());

        game.remove_permanent(aura, Zone::Hand).unwrap();
        run_state_based_actions(&mut game).unwrap();
        assert_eq!(game.permanent(bears).unwrap().controller, P1);
        assert!(game.stolen.is_empty());
    }

    #[test]
    fn test_aura_falls_off_when_host_gains_protection() {
        let mut game = game();
        let host = game.add_permanent(P1, bears());
        let aura = game.add_permanent(
            P0,
            CardDefinition::aura(
                "Pacifism",
                ManaCost::new(1).with_colored(crate::cards::Color::White, 1),
                TargetSpec::Permanent(PermanentFilter::Creature),
            ),
        );
        game.permanent_mut(aura).unwrap().attached_to = Some(host);
        assert!(check_state_based_actions(&game).is_empty());

        game.permanent_mut(host).unwrap().granted_keywords = Keywords::SHROUD;
        // Shroud does not stop an aura that is already attached.
        assert!(check_state_based_actions(&game).is_empty());

        game.add_permanent(
            P1,
            CardDefinition::enchantment("Ward", ManaCost::new(1)).with_static(StaticEffect::Protection {
                color: Some(crate::cards::Color::White),
                scope: Scope::OwnCreatures,
            }),
        );
        assert_eq!(check_state_based_actions(&game), vec![StateBasedAction::AuraFallsOff(aura)]);
        run_state_based_actions(&mut game).unwrap();
        assert!(!game.is_on_battlefield(aura));
        assert_eq!(game.player(P0).graveyard.len(), 1);
        assert!(game.log.contains("Pacifism is put into its owner's graveyard."));
    }
}
