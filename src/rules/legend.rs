//! The legend rule.
//!
//! A player who controls two or more legendary permanents with the same
//! name keeps one of their choice and puts the rest into their owners'
//! graveyards. The choice needs an answer, so this is not a state-based
//! action: the game loop checks it once state-based actions have
//! settled and before waiting triggers go on the stack. One name is
//! handled per prompt, players in APNAP order.

use tracing::debug;

use crate::core::{GameData, InvariantViolation, PermanentId, PlayerId};
use crate::interaction::{AwaitingInput, Prompt, Resume};
use crate::zones::Zone;

/// Whether `id` is a legendary permanent named `name`.
#[must_use]
pub fn is_legend_named(game: &GameData, id: PermanentId, name: &str) -> bool {
    game.permanent(id)
        .and_then(|perm| game.card(perm.card).ok())
        .is_some_and(|card| card.def.legendary && card.def.name == name)
}

/// `player`'s first name held by more than one legendary permanent, with
/// those permanents in arrival order.
fn first_conflict(game: &GameData, player: PlayerId) -> Option<(String, Vec<PermanentId>)> {
    let mut groups: Vec<(String, Vec<PermanentId>)> = Vec::new();
    for id in game.player(player).battlefield.iter().copied() {
        let Some(card) = game.permanent(id).and_then(|perm| game.card(perm.card).ok()) else {
            continue;
        };
        if !card.def.legendary {
            continue;
        }
        match groups.iter_mut().find(|(name, _)| *name == card.def.name) {
            Some((_, ids)) => ids.push(id),
            None => groups.push((card.def.name.clone(), vec![id])),
        }
    }
    groups.into_iter().find(|(_, ids)| ids.len() > 1)
}

/// Ask about the first legend-rule conflict. Returns `true` if a prompt
/// was issued.
pub fn check_legend_rule(game: &mut GameData) -> bool {
    let data: &GameData = game;
    let conflict = data
        .live_players_apnap()
        .find_map(|player| first_conflict(data, player).map(|(name, ids)| (player, name, ids)));
    let Some((player, name, candidates)) = conflict else {
        return false;
    };
    debug!(%player, %name, count = candidates.len(), "legend rule applies");
    let prompt = Prompt::LegendRule { name, candidates };
    let input = AwaitingInput::new(game, player, prompt, Resume::Settle);
    game.awaiting = Some(input);
    true
}

/// Keep `kept`; `player`'s other legendary permanents named `name` go to
/// the graveyard.
pub fn apply_legend_rule(
    game: &mut GameData,
    player: PlayerId,
    name: &str,
    kept: PermanentId,
) -> Result<(), InvariantViolation> {
    let others: Vec<PermanentId> = game
        .player(player)
        .battlefield
        .iter()
        .copied()
        .filter(|id| *id != kept && is_legend_named(game, *id, name))
        .collect();
    game.log.push(format!("{player} keeps {}.", game.permanent_name(kept)));
    for id in others {
        game.remove_permanent(id, Zone::Graveyard)?;
        game.log.push(format!("{name} is put into its owner's graveyard (legend rule)."));
    }
    Ok(())
}
