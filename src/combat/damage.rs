//! Combat damage.
//!
//! Each damage step first works out every assignment, then deals all of
//! it at once. Assignments are computed from characteristics at the start
//! of the step, so a creature killed by simultaneous damage still deals
//! its own.
//!
//! An attacker that may assign its damage as though it weren't blocked
//! asks its controller how to split the damage between the defending
//! player and its blockers. The step is suspended until every such split
//! has been submitted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cards::Keywords;
use crate::continuous;
use crate::core::{GameData, GameResult, PermanentId, PlayerId, RuleViolation};
use crate::effects::{deal_damage, DamageRecipient, DamageSource};
use crate::interaction::{AwaitingInput, Prompt, Resume};

/// Whether the damage step finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatProgress {
    Complete,
    Suspended,
}

/// Damage from one combatant to one recipient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatAssignment {
    pub source: PermanentId,
    pub to: DamageRecipient,
    pub amount: i32,
}

/// A damage step waiting on damage splits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCombatDamage {
    pub first_strike: bool,
    pub assignments: Vec<CombatAssignment>,
    /// Attackers whose controller still has to split their damage.
    pub undecided: Vec<PermanentId>,
}

fn deals_damage_now(game: &GameData, id: PermanentId, first_strike: bool) -> bool {
    let Some(c) = continuous::characteristics(game, id) else {
        return false;
    };
    if !c.is_creature() {
        return false;
    }
    let double = c.keywords.contains(Keywords::DOUBLE_STRIKE);
    if first_strike {
        double || c.keywords.contains(Keywords::FIRST_STRIKE)
    } else {
        double || !game.combat.first_strike_dealt.contains(&id)
    }
}

/// Damage still needed to destroy `id`.
fn lethal_damage(game: &GameData, id: PermanentId) -> i32 {
    let marked = game.permanent(id).map_or(0, |p| p.damage);
    (continuous::effective_toughness(game, id) - marked).max(0)
}

/// Blockers of `attacker` that are still on the battlefield.
fn live_blockers(game: &GameData, attacker: PermanentId) -> Vec<PermanentId> {
    game.combat
        .blockers_of(attacker)
        .into_iter()
        .filter(|b| game.is_on_battlefield(*b))
        .collect()
}

fn defender(game: &GameData) -> PlayerId {
    game.combat
        .defending_player
        .unwrap_or_else(|| game.defending_player())
}

/// Ordinary assignment for a blocked attacker: lethal damage to each
/// blocker in order, the rest to the last blocker, or to the defending
/// player with trample.
fn assign_blocked(game: &GameData, attacker: PermanentId, power: i32, out: &mut Vec<CombatAssignment>) {
    let trample = continuous::has_keyword(game, attacker, Keywords::TRAMPLE);
    let blockers = live_blockers(game, attacker);
    let mut remaining = power;

    if blockers.is_empty() {
        if trample {
            out.push(CombatAssignment {
                source: attacker,
                to: DamageRecipient::Player(defender(game)),
                amount: remaining,
            });
        }
        return;
    }

    let last = blockers.len() - 1;
    for (i, blocker) in blockers.iter().enumerate() {
        if remaining <= 0 {
            break;
        }
        let amount = if i == last && !trample {
            remaining
        } else {
            lethal_damage(game, *blocker).min(remaining)
        };
        if amount > 0 {
            out.push(CombatAssignment {
                source: attacker,
                to: DamageRecipient::Permanent(*blocker),
                amount,
            });
        }
        remaining -= amount;
    }
    if remaining > 0 {
        let to = if trample {
            DamageRecipient::Player(defender(game))
        } else {
            DamageRecipient::Permanent(blockers[last])
        };
        out.push(CombatAssignment {
            source: attacker,
            to,
            amount: remaining,
        });
    }
}

/// Run the first-strike or regular combat damage step.
pub fn resolve_combat_damage(game: &mut GameData, first_strike: bool) -> GameResult<CombatProgress> {
    let mut pending = PendingCombatDamage {
        first_strike,
        assignments: Vec::new(),
        undecided: Vec::new(),
    };
    let mut dealt: Vec<PermanentId> = Vec::new();

    for attacker in game.combat.attackers.clone() {
        if !deals_damage_now(game, attacker, first_strike) {
            continue;
        }
        dealt.push(attacker);
        let power = continuous::effective_power(game, attacker);
        if power <= 0 {
            continue;
        }
        if !game.combat.is_blocked(attacker) {
            pending.assignments.push(CombatAssignment {
                source: attacker,
                to: DamageRecipient::Player(defender(game)),
                amount: power,
            });
        } else if continuous::assigns_damage_as_though_unblocked(game, attacker) {
            if live_blockers(game, attacker).is_empty() {
                pending.assignments.push(CombatAssignment {
                    source: attacker,
                    to: DamageRecipient::Player(defender(game)),
                    amount: power,
                });
            } else {
                pending.undecided.push(attacker);
            }
        } else {
            assign_blocked(game, attacker, power, &mut pending.assignments);
        }
    }

    for block in game.combat.blocks.clone() {
        if dealt.contains(&block.blocker) || !deals_damage_now(game, block.blocker, first_strike) {
            continue;
        }
        // A creature blocking several attackers deals all its damage to
        // the first one still in combat.
        let Some(target) = game
            .combat
            .blocked_by(block.blocker)
            .into_iter()
            .find(|a| game.is_on_battlefield(*a))
        else {
            continue;
        };
        dealt.push(block.blocker);
        let power = continuous::effective_power(game, block.blocker);
        if power > 0 {
            pending.assignments.push(CombatAssignment {
                source: block.blocker,
                to: DamageRecipient::Permanent(target),
                amount: power,
            });
        }
    }

    if first_strike {
        game.combat.first_strike_dealt.extend(dealt);
    }
    continue_combat_damage(game, pending)
}

/// Ask for the next damage split, or deal everything once all are in.
pub fn continue_combat_damage(game: &mut GameData, pending: PendingCombatDamage) -> GameResult<CombatProgress> {
    if let Some(&attacker) = pending.undecided.first() {
        let Some(controller) = continuous::controller_of(game, attacker) else {
            let mut pending = pending;
            pending.undecided.remove(0);
            return continue_combat_damage(game, pending);
        };
        let amount = continuous::effective_power(game, attacker).max(0) as u32;
        let mut recipients = vec![DamageRecipient::Player(defender(game))];
        recipients.extend(live_blockers(game, attacker).into_iter().map(DamageRecipient::Permanent));
        let prompt = Prompt::CombatDamage {
            attacker,
            amount,
            recipients,
        };
        let input = AwaitingInput::new(game, controller, prompt, Resume::Combat(Box::new(pending)));
        game.awaiting = Some(input);
        debug!(%attacker, amount, "combat damage waiting on a split");
        return Ok(CombatProgress::Suspended);
    }

    let count = pending.assignments.len();
    for assignment in &pending.assignments {
        let Some(mut source) = DamageSource::permanent(game, assignment.source) else {
            continue;
        };
        source.combat = true;
        deal_damage(game, &source, assignment.to, assignment.amount);
    }
    debug!(first_strike = pending.first_strike, count, "combat damage dealt");
    Ok(CombatProgress::Complete)
}

/// Record a submitted split for the first undecided attacker.
///
/// The split must name only current legal recipients, without repeats,
/// and add up to the attacker's power.
pub fn assign_combat_damage(
    game: &GameData,
    pending: &mut PendingCombatDamage,
    split: &[(DamageRecipient, u32)],
) -> Result<(), RuleViolation> {
    let Some(&attacker) = pending.undecided.first() else {
        return Err(RuleViolation::InvalidChoice("no damage left to assign".into()));
    };
    let power = continuous::effective_power(game, attacker).max(0) as u32;
    let mut legal = vec![DamageRecipient::Player(defender(game))];
    legal.extend(live_blockers(game, attacker).into_iter().map(DamageRecipient::Permanent));

    let mut seen: Vec<DamageRecipient> = Vec::with_capacity(split.len());
    for (to, _) in split {
        if !legal.contains(to) {
            return Err(RuleViolation::InvalidChoice(format!("{to:?} can't be assigned damage")));
        }
        if seen.contains(to) {
            return Err(RuleViolation::InvalidChoice(format!("{to:?} is listed twice")));
        }
        seen.push(*to);
    }
    let mut total: u32 = 0;
    let mut assignments = Vec::with_capacity(split.len());
    for (to, n) in split {
        let amount = i32::try_from(*n)
            .ok()
            .filter(|_| *n <= power)
            .ok_or_else(|| RuleViolation::InvalidChoice(format!("{n} is more damage than {power}")))?;
        total = total
            .checked_add(*n)
            .ok_or_else(|| RuleViolation::InvalidChoice("assigned damage overflows".into()))?;
        if amount > 0 {
            assignments.push(CombatAssignment {
                source: attacker,
                to: *to,
                amount,
            });
        }
    }
    if total != power {
        return Err(RuleViolation::InvalidChoice(format!(
            "assigned {total} damage, must assign exactly {power}"
        )));
    }

    pending.undecided.remove(0);
    pending.assignments.extend(assignments);
    Ok(())
}
