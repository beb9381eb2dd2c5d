//! Resolving the top of the stack.
//!
//! Targets are re-checked first. An entry that had targets and has lost
//! all of them fizzles: none of its effects run and a spell goes to its
//! owner's graveyard. Otherwise effects run against the targets that are
//! still legal.

use smallvec::SmallVec;
use tracing::debug;

use super::StackEntry;
use crate::continuous::StaticEffect;
use crate::core::{GameData, GameResult, PermanentId, StolenCreature};
use crate::effects::{
    is_legal, run_effects, Continuation, EffectCatalog, Finish, Resolution, ResolveContext, Target,
    TargetSource,
};
use crate::zones::{Zone, ZonePosition};

fn context(entry: &StackEntry, targets: SmallVec<[Target; 2]>, source_permanent: Option<PermanentId>) -> ResolveContext {
    ResolveContext {
        controller: entry.controller,
        source_card: entry.card.id,
        source_name: entry.card.name().to_string(),
        source_color: entry.card.def.color,
        source_permanent,
        targets,
        x_value: entry.x_value,
        event_player: entry.event_player,
    }
}

/// Resolve the top entry. Resolving an empty stack does nothing.
///
/// Afterwards the active player receives priority, unless resolution
/// stopped to ask someone something.
pub fn resolve_top(game: &mut GameData, catalog: &EffectCatalog) -> GameResult<Resolution> {
    let Some(entry) = game.stack.pop() else {
        return Ok(Resolution::Complete);
    };
    let active = game.active_player();
    let description = entry.description();
    debug!(entry = %entry.id, %description, "resolving");

    let source = TargetSource {
        controller: entry.controller,
        color: entry.card.def.color,
    };
    let legal: SmallVec<[Target; 2]> = entry
        .targets
        .iter()
        .copied()
        .filter(|t| is_legal(game, &entry.target_spec, *t, source))
        .collect();

    if !entry.targets.is_empty() && legal.is_empty() {
        let reason = if entry.card.def.is_aura() {
            "illegal target"
        } else {
            "all targets illegal"
        };
        game.log.push(format!("{description} fizzles ({reason})."));
        if entry.kind.is_spell() {
            game.move_card(entry.card.id, Zone::Graveyard, ZonePosition::Top)?;
        }
        game.stack.give_priority(active);
        return Ok(Resolution::Complete);
    }

    if entry.kind.is_permanent_spell() {
        return resolve_permanent(game, catalog, &entry, legal);
    }

    let finish = if entry.kind.is_spell() {
        Finish::SpellToGraveyard(entry.card.id)
    } else {
        Finish::Nothing
    };
    let ctx = context(&entry, legal, entry.source_permanent);
    run_effects(
        game,
        catalog,
        Continuation {
            ctx,
            remaining: entry.effects.clone(),
            finish,
            priority_after: Some(active),
    then: Vec::new(),
        },
    )
}

fn resolve_permanent(
    game: &mut GameData,
    catalog: &EffectCatalog,
    entry: &StackEntry,
    targets: SmallVec<[Target; 2]>,
) -> GameResult<Resolution> {
    let id = game.put_onto_battlefield(entry.card.id, entry.controller)?;
    game.log.push(format!(
        "{} enters the battlefield under {}'s control.",
        entry.card.name(),
        entry.controller
    ));

    if entry.card.def.is_aura() {
        let host = targets.iter().find_map(|t| match t {
            Target::Permanent(host) => Some(*host),
            _ => None,
        });
        if let Some(host) = host {
            attach(game, entry, id, host)?;
        }
    }

    let ctx = context(entry, targets, Some(id));
    run_effects(
        game,
        catalog,
        Continuation {
            ctx,
            remaining: entry.effects.clone(),
            finish: Finish::Nothing,
            priority_after: Some(game.active_player()),
    then: Vec::new(),
        },
    )
}

/// Attach a resolved aura, taking control of the host if the aura says so.
fn attach(game: &mut GameData, entry: &StackEntry, aura: PermanentId, host: PermanentId) -> GameResult<()> {
    if let Some(perm) = game.permanent_mut(aura) {
        perm.attached_to = Some(host);
    }
    let steals = entry
        .card
        .def
        .statics
        .iter()
        .any(|s| matches!(s, StaticEffect::ControlEnchanted));
    let Some(current) = game.permanent(host).map(|p| p.controller) else {
        return Ok(());
    };
    if !steals || current == entry.controller {
        return Ok(());
    }
    let original = game
        .stolen
        .get(&host)
        .map_or(current, |s| s.original_controller);
    game.change_controller(host, entry.controller)?;
    game.stolen.insert(
        host,
        StolenCreature {
            original_controller: original,
            source: Some(aura),
            enchantment_dependent: true,
            until_end_of_turn: false,
        },
    );
    let line = format!("{} gains control of {}.", entry.controller, game.permanent_name(host));
    game.log.push(line);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, CardDefinition};
    use crate::core::{PlayerId, RulesConfig};
    use crate::effects::{Effect, PermanentFilter, TargetSpec};
    use crate::mana::ManaCost;
    use crate::stack::StackEntryKind;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn spell(game: &mut GameData, def: CardDefinition, controller: PlayerId, targets: &[Target]) -> StackEntry {
        let card_id = game.create_card(def, controller);
        let card: Card = game.card(card_id).unwrap().clone();
        let kind = StackEntryKind::for_spell(&card.def).unwrap();
        StackEntry::spell(kind, controller, card).with_targets(targets.iter().copied().collect())
    }

    fn bolt() -> CardDefinition {
        CardDefinition::instant("Lightning Bolt", ManaCost::new(1))
            .with_target(TargetSpec::AnyTarget)
            .with_effect(crate::cards::EffectSlot::Spell, Effect::damage(3))
    }

    #[test]
    fn test_resolve_damage_spell() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let entry = spell(&mut game, bolt(), P0, &[Target::Player(P1)]);
        let card = entry.card.id;
        game.stack.push(entry);

        assert_eq!(resolve_top(&mut game, &EffectCatalog::new()).unwrap(), Resolution::Complete);
        assert_eq!(game.player(P1).life, 17);
        assert!(game.is_in_zone(card, P0, Zone::Graveyard));
        assert!(game.stack.is_empty());
    }

    #[test]
    fn test_fizzle_runs_nothing() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let bears = game.add_permanent(P1, CardDefinition::creature("Grizzly Bears", ManaCost::new(2), 2, 2));
        let entry = spell(&mut game, bolt(), P0, &[Target::Permanent(bears)]);
        let card = entry.card.id;
        game.stack.push(entry);
        game.remove_permanent(bears, Zone::Graveyard).unwrap();

        resolve_top(&mut game, &EffectCatalog::new()).unwrap();
        assert!(game.log.contains("Lightning Bolt fizzles (all targets illegal)."));
        assert!(game.is_in_zone(card, P0, Zone::Graveyard));
        assert!(!game.log.contains("deals 3 damage"));
    }

    #[test]
    fn test_permanent_spell_enters() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let entry = spell(
            &mut game,
            CardDefinition::creature("Grizzly Bears", ManaCost::new(2), 2, 2),
            P0,
            &[],
        );
        game.stack.push(entry);
        resolve_top(&mut game, &EffectCatalog::new()).unwrap();

        assert_eq!(game.player(P0).battlefield.len(), 1);
        let id = game.player(P0).battlefield[0];
        assert!(game.permanent(id).unwrap().summoning_sick);
        assert!(game.log.contains("Grizzly Bears enters the battlefield under Player 0's control."));
    }

    #[test]
    fn test_control_aura_steals_host() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let bears = game.add_permanent(P1, CardDefinition::creature("Grizzly Bears", ManaCost::new(2), 2, 2));
        let persuasion = CardDefinition::aura(
            "Persuasion",
            ManaCost::new(5),
            TargetSpec::Permanent(PermanentFilter::Creature),
        )
        .with_static(StaticEffect::ControlEnchanted);
        let entry = spell(&mut game, persuasion, P0, &[Target::Permanent(bears)]);
        game.stack.push(entry);
        resolve_top(&mut game, &EffectCatalog::new()).unwrap();

        assert_eq!(game.permanent(bears).unwrap().controller, P0);
        let stolen = game.stolen.get(&bears).unwrap();
        assert_eq!(stolen.original_controller, P1);
        assert!(stolen.enchantment_dependent);
    }

    #[test]
    fn test_aura_fizzles_to_graveyard() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let bears = game.add_permanent(P1, CardDefinition::creature("Grizzly Bears", ManaCost::new(2), 2, 2));
        let aura = CardDefinition::aura("Pacifism", ManaCost::new(2), TargetSpec::Permanent(PermanentFilter::Creature));
        let entry = spell(&mut game, aura, P0, &[Target::Permanent(bears)]);
        let card = entry.card.id;
        game.stack.push(entry);
        game.remove_permanent(bears, Zone::Hand).unwrap();

        resolve_top(&mut game, &EffectCatalog::new()).unwrap();
        assert!(game.log.contains("Pacifism fizzles (illegal target)."));
        assert!(game.is_in_zone(card, P0, Zone::Graveyard));
        assert!(game.player(P0).battlefield.is_empty());
    }
}
