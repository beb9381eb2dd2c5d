//! Applying a submitted choice and resuming.

use tracing::debug;

use super::{AwaitingInput, Choice, Prompt, Resume};
use crate::combat::{assign_combat_damage, continue_combat_damage, CombatProgress};
use crate::core::{
    CardId, GameData, GameResult, InvariantViolation, PermanentId, PlayerId, RuleViolation,
};
use crate::effects::{
    run_effects, shuffle_library, validate_targets, EffectCatalog, Target, TargetSource,
};
use crate::mana::ManaPayment;
use crate::rules;
use crate::stack::casting::complete_cast;
use crate::zones::{Zone, ZonePosition};

fn invalid(message: impl Into<String>) -> RuleViolation {
    RuleViolation::InvalidChoice(message.into())
}

/// Answer the pending prompt.
///
/// The answer is checked against the current game, not against the
/// options recorded when the prompt was issued. A rejected answer leaves
/// the prompt in place.
pub fn submit_choice(
    game: &mut GameData,
    catalog: &EffectCatalog,
    payment: &dyn ManaPayment,
    player: PlayerId,
    choice: Choice,
) -> GameResult<()> {
    let Some(awaiting) = game.awaiting.as_ref() else {
        return Err(InvariantViolation::NoPendingInput.into());
    };
    if awaiting.player != player {
        return Err(RuleViolation::WrongPlayer(player).into());
    }
    let kind = awaiting.kind();
    if choice.kind() != kind {
        return Err(invalid(format!("expected a {kind} choice, got {}", choice.kind())).into());
    }
    validate(game, awaiting, &choice)?;

    let Some(AwaitingInput { prompt, resume, .. }) = game.awaiting.take() else {
        return Err(InvariantViolation::NoPendingInput.into());
    };
    debug!(%player, %kind, "choice accepted");
    apply(game, catalog, payment, player, prompt, resume, choice)
}

fn validate(game: &GameData, awaiting: &AwaitingInput, choice: &Choice) -> Result<(), RuleViolation> {
    let player = awaiting.player;
    let options = awaiting.prompt.options(game, player);
    match (&awaiting.prompt, choice) {
        (Prompt::Discard { .. }, Choice::Discard(card)) => {
            if !options.contains_card(*card) {
                return Err(invalid(format!("{} is not in your hand", game.card_name(*card))));
            }
        }
        (Prompt::Graveyard { optional, .. }, Choice::Graveyard(card)) => match card {
            Some(card) if !options.contains_card(*card) => {
                return Err(invalid(format!("{} can't be returned", game.card_name(*card))));
            }
            None if !optional => return Err(invalid("a card must be chosen")),
            _ => {}
        },
        (Prompt::MultiGraveyard { .. }, Choice::MultiGraveyard(cards)) => {
            let Resume::Cast(pending) = &awaiting.resume else {
                return Err(invalid("no spell is waiting for targets"));
            };
            let def = &game
                .card(pending.card)
                .map_err(|_| RuleViolation::NoSuchCard(pending.card))?
                .def;
            let targets = graveyard_targets(cards);
            let source = TargetSource {
                controller: player,
                color: def.color,
            };
            validate_targets(game, &def.target, &targets, pending.x_value, source)?;
        }
        (Prompt::Color, Choice::Color(_)) | (Prompt::May { .. }, Choice::May(_)) => {}
        (Prompt::Permanent { .. } | Prompt::LegendRule { .. }, Choice::Permanent(id)) => {
            if !options.contains_permanent(*id) {
                return Err(invalid(format!("{} can't be chosen", game.permanent_name(*id))));
            }
        }
        (Prompt::LibrarySearch { can_fail, .. }, Choice::LibrarySearch(card)) => match card {
            Some(card) if !options.contains_card(*card) => {
                return Err(invalid(format!("{} can't be found", game.card_name(*card))));
            }
            None if !can_fail && !options.is_empty() => return Err(invalid("a card must be found")),
            _ => {}
        },
        (Prompt::CombatDamage { .. }, Choice::CombatDamage(split)) => {
            let Resume::Combat(pending) = &awaiting.resume else {
                return Err(invalid("no combat damage is waiting"));
            };
            let mut scratch = (**pending).clone();
            assign_combat_damage(game, &mut scratch, split)?;
        }
        _ => return Err(invalid("choice does not answer the prompt")),
    }
    Ok(())
}

fn graveyard_targets(cards: &[CardId]) -> Vec<Target> {
    cards
        .iter()
        .map(|card| Target::Card {
            zone: Zone::Graveyard,
            card: *card,
        })
        .collect()
}

fn reprompt(game: &mut GameData, player: PlayerId, prompt: Prompt, resume: Resume) {
    let input = AwaitingInput::new(game, player, prompt, resume);
    game.awaiting = Some(input);
}

fn apply(
    game: &mut GameData,
    catalog: &EffectCatalog,
    payment: &dyn ManaPayment,
    player: PlayerId,
    prompt: Prompt,
    resume: Resume,
    choice: Choice,
) -> GameResult<()> {
    match (prompt, choice) {
        (Prompt::Discard { remaining }, Choice::Discard(card)) => {
            let name = game.card_name(card);
            game.move_card(card, Zone::Graveyard, ZonePosition::Top)?;
            game.log.push(format!("{player} discards {name}."));
            let remaining = remaining.saturating_sub(1);
            if remaining > 0 {
                if !game.player(player).hand.is_empty() {
                    reprompt(game, player, Prompt::Discard { remaining }, resume);
                    return Ok(());
                }
                game.log.push(format!("{player} has no more cards to discard."));
            }
        }

        (Prompt::Graveyard { .. }, Choice::Graveyard(card)) => match card {
            Some(card) => {
                let name = game.card_name(card);
                game.move_card(card, Zone::Hand, ZonePosition::Top)?;
                game.log.push(format!("{player} returns {name} to their hand."));
            }
            None => game.log.push(format!("{player} chooses not to return a card.")),
        },

        (Prompt::MultiGraveyard { .. }, Choice::MultiGraveyard(cards)) => {
            let Resume::Cast(pending) = resume else {
                return Err(InvariantViolation::NoPendingInput.into());
            };
            return complete_cast(game, payment, *pending, &graveyard_targets(&cards));
        }

        (Prompt::Color, Choice::Color(color)) => {
            if let Resume::Effects(cont) = &resume {
                if let Some(perm) = cont.ctx.source_permanent.and_then(|id| game.permanent_mut(id)) {
                    perm.chosen_color = Some(color);
                }
            }
            game.log.push(format!("{player} chooses {color}."));
        }

        (Prompt::May { effect, .. }, Choice::May(accept)) => {
            if accept {
                game.log.push(format!("{player} chooses to use the ability."));
                if let Resume::Effects(mut cont) = resume {
                    cont.remaining.insert(0, *effect);
                    return run_effects(game, catalog, *cont).map(|_| ());
                }
            } else {
                game.log.push(format!("{player} declines."));
            }
        }

        (Prompt::Permanent { .. }, Choice::Permanent(id)) => sacrifice(game, player, id)?,

        (Prompt::LegendRule { name, .. }, Choice::Permanent(id)) => {
            rules::apply_legend_rule(game, player, &name, id)?;
        }

        (Prompt::LibrarySearch { to_battlefield, .. }, Choice::LibrarySearch(card)) => {
            match card {
                Some(card) => {
                    let name = game.card_name(card);
                    if to_battlefield {
                        game.put_onto_battlefield(card, player)?;
                    } else {
                        game.move_card(card, Zone::Hand, ZonePosition::Top)?;
                    }
                    game.log.push(format!("{player} searches their library and finds {name}."));
                }
                None => game.log.push(format!("{player} searches their library and finds nothing.")),
            }
            shuffle_library(game, player);
        }

        (Prompt::CombatDamage { .. }, Choice::CombatDamage(split)) => {
            let Resume::Combat(mut pending) = resume else {
                return Err(InvariantViolation::NoPendingInput.into());
            };
            assign_combat_damage(game, &mut pending, &split)?;
            if continue_combat_damage(game, *pending)? == CombatProgress::Complete {
                let active = game.active_player();
                game.stack.give_priority(active);
            }
            return Ok(());
        }

        _ => return Err(invalid("choice does not answer the prompt").into()),
    }
    resume_after(game, catalog, resume)
}

fn sacrifice(game: &mut GameData, player: PlayerId, id: PermanentId) -> GameResult<()> {
    let name = game.permanent_name(id);
    game.remove_permanent(id, Zone::Graveyard)?;
    game.log.push(format!("{player} sacrifices {name}."));
    Ok(())
}

fn resume_after(game: &mut GameData, catalog: &EffectCatalog, resume: Resume) -> GameResult<()> {
    match resume {
        Resume::Effects(cont) => run_effects(game, catalog, *cont).map(|_| ()),
        Resume::Cleanup => rules::finish_cleanup(game),
        Resume::Settle => Ok(()),
        // Handled where the choice was applied.
        Resume::Cast(_) | Resume::Combat(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use smallvec::SmallVec;

    use super::*;
    use crate::cards::{CardDefinition, Color};
    use crate::core::{GameError, RulesConfig};
    use crate::effects::{CardFilter, Continuation, Effect, Finish, Recipient, ResolveContext};
    use crate::mana::{ManaCost, StandardPayment};

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn ctx(controller: PlayerId) -> ResolveContext {
        ResolveContext {
            controller,
            source_card: CardId::new(999),
            source_name: "Mind Rot".into(),
            source_color: None,
            source_permanent: None,
            targets: SmallVec::new(),
            x_value: 0,
            event_player: None,
        }
    }

    fn start(game: &mut GameData, effects: Vec<Effect>) {
        let cont = Continuation {
            ctx: ctx(P0),
            remaining: effects,
            finish: Finish::Nothing,
            priority_after: Some(P0),
            then: Vec::new(),
        };
        run_effects(game, &EffectCatalog::new(), cont).unwrap();
    }

    fn submit(game: &mut GameData, player: PlayerId, choice: Choice) -> GameResult<()> {
        submit_choice(game, &EffectCatalog::new(), &StandardPayment, player, choice)
    }

    #[test]
    fn test_no_pending_prompt_is_invariant() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let err = submit(&mut game, P0, Choice::May(true)).unwrap_err();
        assert_eq!(err, GameError::Invariant(InvariantViolation::NoPendingInput));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_discard_two_reprompts() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let a = game.add_card(P1, Zone::Hand, CardDefinition::instant("A", ManaCost::new(1)));
        let b = game.add_card(P1, Zone::Hand, CardDefinition::instant("B", ManaCost::new(1)));
        game.add_card(P1, Zone::Hand, CardDefinition::instant("C", ManaCost::new(1)));
        start(&mut game, vec![Effect::discard(2, Recipient::EachOpponent)]);

        assert_eq!(
            submit(&mut game, P0, Choice::Discard(a)).unwrap_err(),
            GameError::Rule(RuleViolation::WrongPlayer(P0))
        );
        submit(&mut game, P1, Choice::Discard(a)).unwrap();
        let awaiting = game.awaiting.as_ref().unwrap();
        assert_eq!(awaiting.prompt, Prompt::Discard { remaining: 1 });

        // A card that already left the hand is no longer valid.
        assert!(submit(&mut game, P1, Choice::Discard(a)).is_err());
        submit(&mut game, P1, Choice::Discard(b)).unwrap();
        assert!(game.awaiting.is_none());
        assert_eq!(game.player(P1).hand.len(), 1);
        assert_eq!(game.player(P1).graveyard.len(), 2);
    }

    #[test]
    fn test_discard_stops_when_hand_empties() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let only = game.add_card(P1, Zone::Hand, CardDefinition::instant("A", ManaCost::new(1)));
        start(&mut game, vec![Effect::discard(2, Recipient::EachOpponent)]);
        submit(&mut game, P1, Choice::Discard(only)).unwrap();
        assert!(game.awaiting.is_none());
        assert!(game.log.contains("Player 1 has no more cards to discard."));
    }

    #[test]
    fn test_may_yes_runs_inner_effect() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        start(&mut game, vec![Effect::may(Effect::gain_life(3), "Gain 3 life?"), Effect::gain_life(1)]);
        assert!(submit(&mut game, P0, Choice::Color(Color::Red)).is_err());
        submit(&mut game, P0, Choice::May(true)).unwrap();
        assert_eq!(game.player(P0).life, 24);
    }

    #[test]
    fn test_may_no_skips_inner_effect() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        start(&mut game, vec![Effect::may(Effect::gain_life(3), "Gain 3 life?"), Effect::gain_life(1)]);
        submit(&mut game, P0, Choice::May(false)).unwrap();
        assert_eq!(game.player(P0).life, 21);
    }

    #[test]
    fn test_optional_graveyard_return() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let bears = game.add_card(P0, Zone::Graveyard, CardDefinition::creature("Bears", ManaCost::new(2), 2, 2));
        start(
            &mut game,
            vec![Effect::ReturnFromGraveyard {
                filter: CardFilter::Creature,
                optional: false,
            }],
        );
        assert!(submit(&mut game, P0, Choice::Graveyard(None)).is_err());
        submit(&mut game, P0, Choice::Graveyard(Some(bears))).unwrap();
        assert!(game.is_in_zone(bears, P0, Zone::Hand));
    }

    #[test]
    fn test_library_search_fail_to_find() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        game.add_card(P0, Zone::Library, CardDefinition::creature("Bears", ManaCost::new(2), 2, 2));
        start(
            &mut game,
            vec![Effect::SearchLibrary {
                filter: CardFilter::Creature,
                to_battlefield: true,
                can_fail: true,
            }],
        );
        submit(&mut game, P0, Choice::LibrarySearch(None)).unwrap();
        assert!(game.log.contains("Player 0 searches their library and finds nothing."));
        assert_eq!(game.player(P0).library.len(), 1);
    }
}
