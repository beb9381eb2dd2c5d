//! Playing lands, casting spells, activating abilities and passing.
//!
//! Every operation validates completely before it changes anything, so a
//! rejected action leaves the game exactly as it was.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use super::resolution::resolve_top;
use super::{StackEntry, StackEntryKind};
use crate::cards::{CardType, Keywords};
use crate::continuous;
use crate::core::{CardId, GameData, GameResult, PermanentId, PlayerId, RuleViolation};
use crate::effects::{
    legal_targets, run_effects, target_names, validate_targets, Continuation, EffectCatalog, Finish, ResolveContext,
    Target, TargetCount, TargetSource, TargetSpec,
};
use crate::interaction::{AwaitingInput, Prompt, Resume};
use crate::mana::ManaPayment;
use crate::rules;
use crate::triggers::{collect_triggers, GameEvent};

/// A spell whose targets are being chosen through a prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCast {
    pub player: PlayerId,
    pub card: CardId,
    pub x_value: u32,
}

fn ensure_priority(game: &GameData, player: PlayerId) -> Result<(), RuleViolation> {
    if game.stack.priority_holder() != player {
        return Err(RuleViolation::NotPriorityHolder(player));
    }
    Ok(())
}

fn hand_card(game: &GameData, player: PlayerId, hand_index: usize) -> Result<CardId, RuleViolation> {
    game.player(player)
        .hand
        .get(hand_index)
        .copied()
        .ok_or(RuleViolation::NoSuchHandCard(hand_index))
}

fn battlefield_permanent(game: &GameData, player: PlayerId, index: usize) -> Result<PermanentId, RuleViolation> {
    game.battlefield_at(player, index)
        .ok_or(RuleViolation::NoSuchBattlefieldIndex(index))
}

/// Play a land from hand. One per turn, at sorcery timing.
pub fn play_land(game: &mut GameData, player: PlayerId, hand_index: usize) -> GameResult<()> {
    ensure_priority(game, player)?;
    let card = hand_card(game, player, hand_index)?;
    let name = game.card_name(card);
    if !game.card(card)?.def.has_type(CardType::Land) {
        return Err(RuleViolation::NotALand(name).into());
    }
    if !game.is_sorcery_timing(player) {
        return Err(RuleViolation::WrongStep(game.step()).into());
    }
    if game.player(player).lands_played_this_turn >= 1 {
        return Err(RuleViolation::LandAlreadyPlayed.into());
    }

    game.player_mut(player).lands_played_this_turn += 1;
    game.put_onto_battlefield(card, player)?;
    game.log.push(format!("{player} plays {name}."));
    game.stack.reset_passes();
    Ok(())
}

/// Tap a land for mana. Land-tap triggers resolve on the spot.
pub fn tap_land(game: &mut GameData, catalog: &EffectCatalog, player: PlayerId, index: usize) -> GameResult<()> {
    ensure_priority(game, player)?;
    let land = battlefield_permanent(game, player, index)?;
    let name = game.permanent_name(land);
    if !continuous::has_type(game, land, CardType::Land) {
        return Err(RuleViolation::NotALand(name).into());
    }
    let perm = game.permanent(land).ok_or(RuleViolation::NoSuchPermanent(land))?;
    if perm.tapped {
        return Err(RuleViolation::AlreadyTapped(name).into());
    }
    let produces = game.permanent_card(land)?.def.produces;

    if let Some(perm) = game.permanent_mut(land) {
        perm.tapped = true;
    }
    if let Some(color) = produces {
        game.player_mut(player).mana_pool.add(color, 1);
    }
    game.log.push(format!("{player} taps {name} for mana."));

    let triggers = collect_triggers(game, &GameEvent::LandTapped { player, land })?;
    let mut batch = Vec::with_capacity(triggers.len());
    for trigger in triggers {
        game.log.push(format!("{}'s ability triggers.", trigger.source.name()));
        let ctx = ResolveContext {
            controller: trigger.controller,
            source_card: trigger.source.id,
            source_name: trigger.source.name().to_string(),
            source_color: trigger.source.def.color,
            source_permanent: trigger.source_permanent,
            targets: SmallVec::new(),
            x_value: 0,
            event_player: trigger.event_player,
        };
        batch.push(Continuation {
            ctx,
            remaining: trigger.effects,
            finish: Finish::Nothing,
            priority_after: None,
            then: Vec::new(),
        });
    }
    // A trigger waiting on its controller carries the rest of the batch.
    if let Some(chain) = Continuation::chain(batch) {
        run_effects(game, catalog, chain)?;
    }
    game.stack.reset_passes();
    Ok(())
}

/// X values must fit the signed amounts effects work with.
fn check_x(x_value: u32) -> Result<(), RuleViolation> {
    if i32::try_from(x_value).is_err() {
        return Err(RuleViolation::XOutOfRange(x_value));
    }
    Ok(())
}

fn check_spell_timing(game: &GameData, player: PlayerId, card: CardId) -> Result<(), RuleViolation> {
    let def = &game.card(card).map_err(|_| RuleViolation::NoSuchCard(card))?.def;
    if def.has_type(CardType::Land) {
        return Err(RuleViolation::LandNotCastable);
    }
    if !def.has_type(CardType::Instant) && !game.is_sorcery_timing(player) {
        return Err(RuleViolation::SorcerySpeed(def.name.clone()));
    }
    Ok(())
}

fn check_mana(
    game: &GameData,
    payment: &dyn ManaPayment,
    player: PlayerId,
    card: CardId,
    x_value: u32,
) -> Result<(), RuleViolation> {
    let cost = &game.card(card).map_err(|_| RuleViolation::NoSuchCard(card))?.def.mana_cost;
    if !payment.can_pay(&game.player(player).mana_pool, cost, x_value) {
        return Err(RuleViolation::InsufficientMana(cost.to_string()));
    }
    Ok(())
}

/// Cast the card at `hand_index`.
///
/// A spell targeting X cards in its caster's graveyard may be cast
/// without targets; its caster is then asked to choose them.
pub fn cast_spell(
    game: &mut GameData,
    payment: &dyn ManaPayment,
    player: PlayerId,
    hand_index: usize,
    x_value: u32,
    targets: &[Target],
) -> GameResult<()> {
    ensure_priority(game, player)?;
    let card = hand_card(game, player, hand_index)?;
    check_spell_timing(game, player, card)?;
    check_x(x_value)?;
    check_mana(game, payment, player, card, x_value)?;

    let def = &game.card(card)?.def;
    let spec = def.target.clone();
    let source = TargetSource {
        controller: player,
        color: def.color,
    };

    if let TargetSpec::GraveyardCards {
        filter,
        count: TargetCount::X,
    } = spec
    {
        if targets.is_empty() && x_value > 0 {
            let available = legal_targets(game, &spec, source).len();
            if available < x_value as usize {
                return Err(RuleViolation::IllegalTarget(format!(
                    "needs {x_value} card(s) from the graveyard, only {available} can be chosen"
                ))
                .into());
            }
            let prompt = Prompt::MultiGraveyard {
                filter,
                count: x_value,
            };
            let pending = PendingCast {
                player,
                card,
                x_value,
            };
            let input = AwaitingInput::new(game, player, prompt, Resume::Cast(Box::new(pending)));
            game.awaiting = Some(input);
            debug!(%player, %card, x_value, "cast waiting on graveyard targets");
            return Ok(());
        }
    }

    validate_targets(game, &spec, targets, x_value, source)?;
    complete_cast(game, payment, PendingCast { player, card, x_value }, targets)
}

/// Pay for a spell and put it on the stack with the given targets.
///
/// Targets must already be validated.
pub fn complete_cast(
    game: &mut GameData,
    payment: &dyn ManaPayment,
    pending: PendingCast,
    targets: &[Target],
) -> GameResult<()> {
    let PendingCast { player, card, x_value } = pending;
    let card_data = game.card(card)?.clone();
    let kind = StackEntryKind::for_spell(&card_data.def).ok_or(RuleViolation::LandNotCastable)?;
    let cost = card_data.def.mana_cost.clone();

    payment.pay(&mut game.player_mut(player).mana_pool, &cost, x_value)?;
    game.player_mut(player).hand.retain(|c| *c != card);

    let name = card_data.name().to_string();
    let entry = StackEntry::spell(kind, player, card_data)
        .with_targets(targets.iter().copied().collect())
        .with_x(x_value);
    let id = game.stack.push(entry);

    if targets.is_empty() {
        game.log.push(format!("{player} casts {name}."));
    } else {
        let names = target_names(game, targets);
        game.log.push(format!("{player} casts {name} targeting {names}."));
    }
    debug!(entry = %id, %player, %name, "spell cast");
    Ok(())
}

/// Activate ability `ability` of the permanent at `index`.
pub fn activate_ability(
    game: &mut GameData,
    payment: &dyn ManaPayment,
    player: PlayerId,
    index: usize,
    ability: usize,
    x_value: u32,
    targets: &[Target],
) -> GameResult<()> {
    ensure_priority(game, player)?;
    let id = battlefield_permanent(game, player, index)?;
    let name = game.permanent_name(id);
    let card = game.permanent_card(id)?.clone();
    let Some(def) = card.def.abilities.get(ability).cloned() else {
        return Err(RuleViolation::NoSuchAbility { name, index: ability }.into());
    };
    let perm = game.permanent(id).ok_or(RuleViolation::NoSuchPermanent(id))?;

    if def.sorcery_speed && !game.is_sorcery_timing(player) {
        return Err(RuleViolation::SorcerySpeed(name).into());
    }
    if def.per_turn_limit.is_some_and(|limit| perm.uses_of(ability) >= limit) {
        return Err(RuleViolation::ActivationLimit(name).into());
    }
    if def.tap {
        if perm.tapped {
            return Err(RuleViolation::AlreadyTapped(name).into());
        }
        if perm.summoning_sick
            && continuous::is_creature(game, id)
            && !continuous::has_keyword(game, id, Keywords::HASTE)
        {
            return Err(RuleViolation::SummoningSick(name).into());
        }
    }
    check_x(x_value)?;
    if !payment.can_pay(&game.player(player).mana_pool, &def.cost, x_value) {
        return Err(RuleViolation::InsufficientMana(def.cost.to_string()).into());
    }
    let source = TargetSource {
        controller: player,
        color: continuous::color_of(game, id),
    };
    validate_targets(game, &def.target, targets, x_value, source)?;

    payment.pay(&mut game.player_mut(player).mana_pool, &def.cost, x_value)?;
    if let Some(perm) = game.permanent_mut(id) {
        if def.tap {
            perm.tapped = true;
        }
        perm.record_use(ability);
    }

    let entry = StackEntry {
        id: super::StackEntryId::new(0),
        kind: StackEntryKind::ActivatedAbility,
        controller: player,
        card,
        source_permanent: Some(id),
        effects: def.effects,
        targets: targets.iter().copied().collect(),
        target_spec: def.target,
        x_value,
        event_player: None,
    };
    let entry_id = game.stack.push(entry);
    game.log.push(format!("{player} activates {name}'s ability."));
    debug!(entry = %entry_id, %player, %name, "ability activated");
    Ok(())
}

/// Pass priority. When every live player has passed in a row, the top of
/// the stack resolves, or the game moves to the next step when the stack
/// is empty.
pub fn pass_priority(game: &mut GameData, catalog: &EffectCatalog, player: PlayerId) -> GameResult<()> {
    ensure_priority(game, player)?;
    let all_passed = {
        let players = &game.players;
        game.stack.pass(|p| !players[p].has_lost)
    };
    if !all_passed {
        return Ok(());
    }
    if game.stack.is_empty() {
        rules::advance_step(game)
    } else {
        resolve_top(game, catalog).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, EffectSlot, Subtype};
    use crate::core::{GameError, RulesConfig};
    use crate::effects::{CardFilter, Effect};
    use crate::mana::{ManaColor, ManaCost, StandardPayment};
    use crate::rules::Step;
    use crate::zones::Zone;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn main_phase() -> GameData {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        game.turn.step = Step::PrecombatMain;
        game
    }

    fn shock() -> CardDefinition {
        CardDefinition::instant("Shock", ManaCost::new(1))
            .with_target(TargetSpec::AnyTarget)
            .with_effect(EffectSlot::Spell, Effect::damage(2))
    }

    #[test]
    fn test_play_land_once() {
        let mut game = main_phase();
        game.add_card(P0, Zone::Hand, CardDefinition::basic_land(Subtype::Forest));
        game.add_card(P0, Zone::Hand, CardDefinition::basic_land(Subtype::Forest));

        play_land(&mut game, P0, 0).unwrap();
        assert_eq!(game.player(P0).battlefield.len(), 1);
        assert_eq!(
            play_land(&mut game, P0, 0).unwrap_err(),
            GameError::Rule(RuleViolation::LandAlreadyPlayed)
        );
    }

    #[test]
    fn test_tap_land_adds_mana() {
        let mut game = main_phase();
        let forest = game.add_permanent(P0, CardDefinition::basic_land(Subtype::Forest));
        tap_land(&mut game, &EffectCatalog::new(), P0, 0).unwrap();
        assert!(game.permanent(forest).unwrap().tapped);
        assert_eq!(game.player(P0).mana_pool.get(ManaColor::Green), 1);
        assert!(matches!(
            tap_land(&mut game, &EffectCatalog::new(), P0, 0),
            Err(GameError::Rule(RuleViolation::AlreadyTapped(_)))
        ));
    }

    #[test]
    fn test_cast_pays_and_pushes() {
        let mut game = main_phase();
        game.add_card(P0, Zone::Hand, shock());
        game.player_mut(P0).mana_pool.add(ManaColor::Red, 1);

        cast_spell(&mut game, &StandardPayment, P0, 0, 0, &[Target::Player(P1)]).unwrap();
        assert_eq!(game.stack.len(), 1);
        assert!(game.player(P0).hand.is_empty());
        assert_eq!(game.player(P0).mana_pool.total(), 0);
        assert!(game.log.contains("Player 0 casts Shock targeting Player 1."));
    }

    #[test]
    fn test_cast_rejections_leave_state() {
        let mut game = main_phase();
        game.add_card(P0, Zone::Hand, shock());

        assert!(matches!(
            cast_spell(&mut game, &StandardPayment, P0, 0, 0, &[Target::Player(P1)]),
            Err(GameError::Rule(RuleViolation::InsufficientMana(_)))
        ));
        game.player_mut(P0).mana_pool.add(ManaColor::Red, 1);
        assert!(matches!(
            cast_spell(&mut game, &StandardPayment, P0, 0, 0, &[]),
            Err(GameError::Rule(RuleViolation::IllegalTarget(_)))
        ));
        assert_eq!(
            cast_spell(&mut game, &StandardPayment, P1, 0, 0, &[]).unwrap_err(),
            GameError::Rule(RuleViolation::NotPriorityHolder(P1))
        );
        assert_eq!(game.player(P0).hand.len(), 1);
        assert_eq!(game.player(P0).mana_pool.total(), 1);
        assert!(game.stack.is_empty());
    }

    #[test]
    fn test_sorcery_speed() {
        let mut game = main_phase();
        game.add_card(P0, Zone::Hand, CardDefinition::creature("Grizzly Bears", ManaCost::new(0), 2, 2));
        game.turn.step = Step::Upkeep;
        assert!(matches!(
            cast_spell(&mut game, &StandardPayment, P0, 0, 0, &[]),
            Err(GameError::Rule(RuleViolation::SorcerySpeed(_)))
        ));
    }

    #[test]
    fn test_x_graveyard_spell_prompts() {
        let mut game = main_phase();
        let spell = CardDefinition::sorcery("Exhume the Fallen", ManaCost::new(0).with_x()).with_target(
            TargetSpec::GraveyardCards {
                filter: CardFilter::Creature,
                count: TargetCount::X,
            },
        );
        game.add_card(P0, Zone::Hand, spell);
        game.add_card(P0, Zone::Graveyard, CardDefinition::creature("Bears", ManaCost::new(2), 2, 2));
        game.player_mut(P0).mana_pool.add(ManaColor::Colorless, 1);

        cast_spell(&mut game, &StandardPayment, P0, 0, 1, &[]).unwrap();
        let awaiting = game.awaiting.as_ref().unwrap();
        assert_eq!(
            awaiting.prompt,
            Prompt::MultiGraveyard {
                filter: CardFilter::Creature,
                count: 1
            }
        );
        // Still in hand and unpaid until the targets are chosen.
        assert_eq!(game.player(P0).hand.len(), 1);
        assert_eq!(game.player(P0).mana_pool.total(), 1);
    }

    #[test]
    fn test_x_larger_than_graveyard_is_rejected() {
        let mut game = main_phase();
        let spell = CardDefinition::sorcery("Exhume the Fallen", ManaCost::new(0).with_x()).with_target(
            TargetSpec::GraveyardCards {
                filter: CardFilter::Creature,
                count: TargetCount::X,
            },
        );
        game.add_card(P0, Zone::Hand, spell);
        game.add_card(P0, Zone::Graveyard, CardDefinition::creature("Bears", ManaCost::new(2), 2, 2));
        game.add_card(P1, Zone::Graveyard, CardDefinition::creature("Bears", ManaCost::new(2), 2, 2));
        game.player_mut(P0).mana_pool.add(ManaColor::Colorless, 3);

        assert!(matches!(
            cast_spell(&mut game, &StandardPayment, P0, 0, 2, &[]),
            Err(GameError::Rule(RuleViolation::IllegalTarget(_)))
        ));
        assert!(game.awaiting.is_none());
        assert_eq!(game.player(P0).hand.len(), 1);
        assert_eq!(game.player(P0).mana_pool.total(), 3);
        assert_eq!(
            cast_spell(&mut game, &StandardPayment, P0, 0, u32::MAX, &[]).unwrap_err(),
            GameError::Rule(RuleViolation::XOutOfRange(u32::MAX))
        );
    }

    #[test]
    fn test_activate_with_tap_cost_and_limit() {
        let mut game = main_phase();
        let pinger = CardDefinition::creature("Prodigal Sorcerer", ManaCost::new(3), 1, 1).with_ability(
            crate::cards::ActivatedAbility::new(ManaCost::free(), vec![Effect::damage(1)])
                .with_tap()
                .with_target(TargetSpec::AnyTarget),
        );
        let id = game.add_permanent(P0, pinger);
        game.permanent_mut(id).unwrap().summoning_sick = true;
        assert!(matches!(
            activate_ability(&mut game, &StandardPayment, P0, 0, 0, 0, &[Target::Player(P1)]),
            Err(GameError::Rule(RuleViolation::SummoningSick(_)))
        ));

        game.permanent_mut(id).unwrap().summoning_sick = false;
        activate_ability(&mut game, &StandardPayment, P0, 0, 0, 0, &[Target::Player(P1)]).unwrap();
        assert!(game.permanent(id).unwrap().tapped);
        assert_eq!(game.stack.top().unwrap().source_permanent, Some(id));
        assert!(matches!(
            activate_ability(&mut game, &StandardPayment, P0, 0, 0, 0, &[Target::Player(P1)]),
            Err(GameError::Rule(RuleViolation::AlreadyTapped(_)))
        ));
    }

    #[test]
    fn test_both_pass_resolves_top() {
        let mut game = main_phase();
        game.add_card(P0, Zone::Hand, shock());
        game.player_mut(P0).mana_pool.add(ManaColor::Red, 1);
        cast_spell(&mut game, &StandardPayment, P0, 0, 0, &[Target::Player(P1)]).unwrap();

        let catalog = EffectCatalog::new();
        pass_priority(&mut game, &catalog, P0).unwrap();
        assert_eq!(game.stack.priority_holder(), P1);
        assert_eq!(game.stack.len(), 1);
        pass_priority(&mut game, &catalog, P1).unwrap();
        assert!(game.stack.is_empty());
        assert_eq!(game.player(P1).life, 18);
        assert_eq!(game.stack.priority_holder(), P0);
    }
}
