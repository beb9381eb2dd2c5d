//! Attack and block declarations.
//!
//! Both declarations are all-or-nothing: every chosen creature and every
//! pairing is validated before anything is tapped or marked.

use rustc_hash::FxHashMap;
use tracing::debug;

use super::Block;
use crate::cards::{CardType, Color, Keywords};
use crate::continuous::{self, Characteristics};
use crate::core::{BlockAssignment, GameData, GameResult, PermanentId, PlayerId, RuleViolation};
use crate::rules::Step;

fn characteristics(game: &GameData, id: PermanentId) -> Result<Characteristics, RuleViolation> {
    continuous::characteristics(game, id).ok_or(RuleViolation::NoSuchPermanent(id))
}

/// Why `id` can't attack, if it can't.
fn attack_restriction(game: &GameData, id: PermanentId) -> Result<Option<&'static str>, RuleViolation> {
    let c = characteristics(game, id)?;
    let perm = game.permanent(id).ok_or(RuleViolation::NoSuchPermanent(id))?;
    let reason = if !c.is_creature() {
        Some("is not a creature")
    } else if perm.tapped {
        Some("is tapped")
    } else if perm.summoning_sick && !c.keywords.contains(Keywords::HASTE) {
        Some("has summoning sickness")
    } else if c.keywords.contains(Keywords::DEFENDER) {
        Some("has defender")
    } else {
        None
    };
    Ok(reason)
}

/// Declare the creatures at `indices` of `player`'s battlefield as
/// attackers.
pub fn declare_attackers(game: &mut GameData, player: PlayerId, indices: &[usize]) -> GameResult<()> {
    if game.step() != Step::DeclareAttackers {
        return Err(RuleViolation::WrongStep(game.step()).into());
    }
    if player != game.active_player() {
        return Err(RuleViolation::WrongPlayer(player).into());
    }
    if game.combat.attackers_declared {
        return Err(RuleViolation::IllegalAttack("attackers were already declared".into()).into());
    }

    let mut attackers: Vec<PermanentId> = Vec::with_capacity(indices.len());
    for &index in indices {
        let id = game
            .battlefield_at(player, index)
            .ok_or(RuleViolation::NoSuchBattlefieldIndex(index))?;
        if attackers.contains(&id) {
            let name = game.permanent_name(id);
            return Err(RuleViolation::IllegalAttack(format!("{name} is declared twice")).into());
        }
        if let Some(reason) = attack_restriction(game, id)? {
            let name = game.permanent_name(id);
            return Err(RuleViolation::IllegalAttack(format!("{name} {reason}")).into());
        }
        attackers.push(id);
    }

    for &id in &attackers {
        let vigilance = continuous::has_keyword(game, id, Keywords::VIGILANCE);
        if let Some(perm) = game.permanent_mut(id) {
            perm.attacking = true;
            if !vigilance {
                perm.tapped = true;
            }
        }
    }
    let count = attackers.len();
    game.combat.attackers = attackers;
    game.combat.attackers_declared = true;
    game.log.push(format!("{player} declares {count} attacker(s)."));
    debug!(%player, count, "attackers declared");

    game.stack.give_priority(player);
    Ok(())
}

/// Whether the defending player controls a land with this subtype, after
/// text replacements on the attacker.
fn defender_has_land(game: &GameData, defender: PlayerId, attacker: PermanentId, walk: crate::cards::Subtype) -> bool {
    let wanted = game.permanent(attacker).map_or(walk, |p| p.replaced(walk));
    game.player(defender).battlefield.iter().any(|id| {
        continuous::has_type(game, *id, CardType::Land) && continuous::has_subtype(game, *id, wanted)
    })
}

/// Whether `blocker` may block `attacker`, ignoring how many creatures
/// block. `Err` carries the reason.
pub fn can_block(game: &GameData, blocker: PermanentId, attacker: PermanentId) -> Result<(), String> {
    let b = continuous::characteristics(game, blocker).ok_or_else(|| format!("{blocker} is not on the battlefield"))?;
    let a = continuous::characteristics(game, attacker).ok_or_else(|| format!("{attacker} is not on the battlefield"))?;
    let blocker_name = game.permanent_name(blocker);
    let attacker_name = game.permanent_name(attacker);

    if !b.is_creature() {
        return Err(format!("{blocker_name} is not a creature"));
    }
    if game.permanent(blocker).is_some_and(|p| p.tapped) {
        return Err(format!("{blocker_name} is tapped"));
    }
    if a.keywords.contains(Keywords::UNBLOCKABLE) {
        return Err(format!("{attacker_name} can't be blocked"));
    }
    if a.keywords.contains(Keywords::FLYING) && !b.keywords.intersects(Keywords::FLYING | Keywords::REACH) {
        return Err(format!("{attacker_name} has flying"));
    }
    if a.keywords.contains(Keywords::FEAR) && !(b.has_type(CardType::Artifact) || b.color == Some(Color::Black)) {
        return Err(format!("{attacker_name} has fear"));
    }
    let defender = b.controller;
    for (walk, subtype) in Keywords::LANDWALKS {
        if a.keywords.contains(walk) && defender_has_land(game, defender, attacker, subtype) {
            let walked = game.permanent(attacker).map_or(subtype, |p| p.replaced(subtype));
            return Err(format!("{attacker_name} has {}walk", walked.to_string().to_lowercase()));
        }
    }
    if b.color.is_some_and(|color| a.protections.contains(&color)) {
        return Err(format!("{attacker_name} has protection from {blocker_name}'s colour"));
    }
    Ok(())
}

/// Declare blocks. `assignments` index the defending player's battlefield
/// (blockers) and the active player's battlefield (attackers).
pub fn declare_blockers(
    game: &mut GameData,
    player: PlayerId,
    assignments: &[BlockAssignment],
) -> GameResult<()> {
    if game.step() != Step::DeclareBlockers {
        return Err(RuleViolation::WrongStep(game.step()).into());
    }
    if game.combat.defending_player != Some(player) {
        return Err(RuleViolation::WrongPlayer(player).into());
    }
    if game.combat.blockers_declared {
        return Err(RuleViolation::IllegalBlock("blockers were already declared".into()).into());
    }

    let active = game.active_player();
    let limit = game.config.blocks_per_creature;
    let mut blocks: Vec<Block> = Vec::with_capacity(assignments.len());
    let mut per_blocker: FxHashMap<PermanentId, usize> = FxHashMap::default();

    for assignment in assignments {
        let blocker = game
            .battlefield_at(player, assignment.blocker)
            .ok_or(RuleViolation::NoSuchBattlefieldIndex(assignment.blocker))?;
        let attacker = game
            .battlefield_at(active, assignment.attacker)
            .ok_or(RuleViolation::NoSuchBattlefieldIndex(assignment.attacker))?;
        if !game.combat.is_attacking(attacker) {
            let name = game.permanent_name(attacker);
            return Err(RuleViolation::IllegalBlock(format!("{name} is not attacking")).into());
        }
        let block = Block { blocker, attacker };
        if blocks.contains(&block) {
            let name = game.permanent_name(blocker);
            return Err(RuleViolation::IllegalBlock(format!("{name} blocks the same attacker twice")).into());
        }
        let count = per_blocker.entry(blocker).or_insert(0);
        *count += 1;
        if *count > limit {
            let name = game.permanent_name(blocker);
            return Err(RuleViolation::IllegalBlock(format!("{name} can block at most {limit} creature(s)")).into());
        }
        can_block(game, blocker, attacker).map_err(RuleViolation::IllegalBlock)?;
        blocks.push(block);
    }

    for &attacker in &game.combat.attackers {
        let blockers = blocks.iter().filter(|b| b.attacker == attacker).count();
        if blockers == 1 && continuous::has_keyword(game, attacker, Keywords::MENACE) {
            let name = game.permanent_name(attacker);
            return Err(
                RuleViolation::IllegalBlock(format!("{name} can't be blocked except by two or more creatures")).into(),
            );
        }
    }

    for block in &blocks {
        if let Some(perm) = game.permanent_mut(block.blocker) {
            perm.blocking = true;
            perm.blocking_targets.push(block.attacker);
        }
        if !game.combat.blocked.contains(&block.attacker) {
            game.combat.blocked.push(block.attacker);
        }
    }
    let count = per_blocker.len();
    game.combat.blocks = blocks;
    game.combat.blockers_declared = true;
    game.log.push(format!("{player} declares {count} blocker(s)."));
    debug!(%player, count, "blockers declared");

    game.stack.give_priority(active);
    Ok(())
}
