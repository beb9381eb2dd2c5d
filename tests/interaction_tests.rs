//! Prompt and answer scenario tests.

mod common;

use ccg_rules::cards::{CardDefinition, EffectSlot, Subtype};
use ccg_rules::core::{Action, CardId, GameError, RuleViolation};
use ccg_rules::effects::{CardFilter, Effect};
use ccg_rules::game::{Game, Progress};
use ccg_rules::interaction::{Choice, ChoiceKind, Prompt};
use ccg_rules::mana::{ManaColor, ManaCost};
use ccg_rules::rules::Step;
use ccg_rules::zones::Zone;

use common::*;

fn graveyard_card(game: &mut Game, player: ccg_rules::core::PlayerId, def: CardDefinition) -> CardId {
    game.data_mut().add_card(player, Zone::Graveyard, def)
}

// =============================================================================
// X Graveyard Targets
// =============================================================================

/// Test that exactly X of the caster's own creature cards are accepted.
#[test]
fn test_x_graveyard_targets() {
    let mut game = main_phase();
    let first = graveyard_card(&mut game, P0, bears());
    let second = graveyard_card(&mut game, P0, bears());
    let land = graveyard_card(&mut game, P0, CardDefinition::basic_land(Subtype::Swamp));
    let foreign = graveyard_card(&mut game, P1, bears());
    let spell = in_hand(&mut game, P0, exhume());
    add_mana(&mut game, P0, ManaColor::Colorless, 2);

    let progress = game.apply(P0, Action::cast_with_x(spell, 2)).unwrap();
    assert_eq!(
        progress,
        Progress::AwaitingInput {
            player: P0,
            kind: ChoiceKind::MultiGraveyard
        }
    );

    let rejected = [
        vec![first],
        vec![first, second, land],
        vec![first, first],
        vec![first, foreign],
        vec![first, land],
    ];
    for cards in rejected {
        let err = game
            .apply(P0, Action::SubmitChoice(Choice::MultiGraveyard(cards.clone())))
            .unwrap_err();
        assert!(
            matches!(err, GameError::Rule(RuleViolation::IllegalTarget(_))),
            "{cards:?} should be rejected, got {err:?}"
        );
        assert!(game.data().awaiting.is_some());
    }

    game.apply(P0, Action::SubmitChoice(Choice::MultiGraveyard(vec![first, second])))
        .unwrap();
    assert_eq!(game.data().stack.len(), 1);
    assert_eq!(game.data().player(P0).mana_pool.total(), 0);
    assert!(game.data().player(P0).hand.is_empty());

    resolve_top(&mut game);
    let data = game.data();
    assert!(data.is_in_zone(first, P0, Zone::Exile));
    assert!(data.is_in_zone(second, P0, Zone::Exile));
    assert!(data.is_in_zone(land, P0, Zone::Graveyard));
    assert!(data.is_in_zone(foreign, P1, Zone::Graveyard));
    assert_eq!(data.player(P0).battlefield.len(), 2);
    assert!(data.log.contains("creates 2 Zombie token(s)."));
}

/// Test that X larger than the number of choosable cards is rejected at
/// cast time instead of leaving an unanswerable prompt.
#[test]
fn test_x_beyond_graveyard_rejected_at_cast() {
    let mut game = main_phase();
    graveyard_card(&mut game, P0, bears());
    graveyard_card(&mut game, P1, bears());
    let spell = in_hand(&mut game, P0, exhume());
    add_mana(&mut game, P0, ManaColor::Colorless, 3);

    let err = game.apply(P0, Action::cast_with_x(spell, 3)).unwrap_err();
    assert!(matches!(err, GameError::Rule(RuleViolation::IllegalTarget(_))));
    assert!(game.data().awaiting.is_none());
    assert_eq!(game.data().player(P0).hand.len(), 1);
    assert_eq!(game.progress(), Progress::Priority(P0));
    assert_eq!(game.apply(P0, Action::PassPriority).unwrap(), Progress::Priority(P1));
}

/// Test that a wrong player or wrong kind of answer leaves the prompt.
#[test]
fn test_wrong_answers_keep_prompt() {
    let mut game = main_phase();
    graveyard_card(&mut game, P0, bears());
    let spell = in_hand(&mut game, P0, exhume());
    add_mana(&mut game, P0, ManaColor::Colorless, 1);
    game.apply(P0, Action::cast_with_x(spell, 1)).unwrap();

    let err = game
        .apply(P1, Action::SubmitChoice(Choice::MultiGraveyard(vec![])))
        .unwrap_err();
    assert_eq!(err, GameError::Rule(RuleViolation::WrongPlayer(P1)));

    let err = game.apply(P0, Action::SubmitChoice(Choice::May(true))).unwrap_err();
    assert!(matches!(err, GameError::Rule(RuleViolation::InvalidChoice(_))));
    assert!(matches!(
        game.data().awaiting.as_ref().map(|a| &a.prompt),
        Some(Prompt::MultiGraveyard { count: 1, .. })
    ));
}

// =============================================================================
// Cleanup Discard
// =============================================================================

/// Test that the cleanup step asks the active player to discard to hand size.
#[test]
fn test_cleanup_discard_to_hand_size() {
    let mut game = main_phase();
    for _ in 0..9 {
        in_hand(&mut game, P0, bears());
    }
    pass_until(&mut game, Step::End);
    pass(&mut game);
    pass(&mut game);

    assert_eq!(game.data().step(), Step::Cleanup);
    assert_eq!(
        game.progress(),
        Progress::AwaitingInput {
            player: P0,
            kind: ChoiceKind::Discard
        }
    );

    for _ in 0..2 {
        let card = game.data().player(P0).hand[0];
        game.apply(P0, Action::SubmitChoice(Choice::Discard(card))).unwrap();
    }
    assert_eq!(game.data().player(P0).hand.len(), 7);
    assert_eq!(game.data().player(P0).graveyard.len(), 2);
    assert_eq!(game.data().turn.number, 2);
    assert_eq!(game.progress(), Progress::Priority(P1));
}

// =============================================================================
// Library Search
// =============================================================================

/// Test a land search that puts the land onto the battlefield.
#[test]
fn test_search_for_land() {
    let mut game = main_phase();
    let rampant = CardDefinition::sorcery("Rampant Growth", ManaCost::free()).with_effect(
        EffectSlot::Spell,
        Effect::SearchLibrary {
            filter: CardFilter::Land,
            to_battlefield: true,
            can_fail: true,
        },
    );
    let index = in_hand(&mut game, P0, rampant);
    game.apply(P0, Action::cast(index)).unwrap();
    resolve_top(&mut game);
    assert_eq!(
        game.progress(),
        Progress::AwaitingInput {
            player: P0,
            kind: ChoiceKind::LibrarySearch
        }
    );

    let forest = game.data().player(P0).library[0];
    game.apply(P0, Action::SubmitChoice(Choice::LibrarySearch(Some(forest))))
        .unwrap();
    assert_eq!(game.data().player(P0).battlefield.len(), 1);
    assert_eq!(game.data().player(P0).library.len(), 19);
    assert!(game.data().log.contains("Player 0 searches their library and finds Forest."));
}
