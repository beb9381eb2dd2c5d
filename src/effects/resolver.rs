//! Running effect lists, with suspension for player input.
//!
//! [`run_effects`] executes a [`Continuation`] (a context plus the effects
//! still to run) front to back. An effect that needs a decision writes an
//! [`AwaitingInput`] holding the rest of the continuation and stops; the
//! interaction module feeds the answer back and calls `run_effects` again
//! with whatever is left.
//!
//! When the list runs out the continuation's [`Finish`] is applied (an
//! instant or sorcery goes to its owner's graveyard) and priority is
//! handed out if the continuation says so. Continuations queued in
//! [`Continuation::then`] run next, so a batch of triggers that resolve
//! together survives one of them stopping for input.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use super::catalog::EffectCatalog;
use super::damage::{deal_damage, DamageRecipient, DamageSource};
use super::effect::{Effect, Recipient};
use super::targeting::{describe, Target, TargetSource};
use crate::cards::{Color, Keywords};
use crate::core::{CardId, GameData, GameResult, PermanentId, PlayerId, StolenCreature};
use crate::interaction::{AwaitingInput, Prompt, Resume};
use crate::rules::{self, GameOutcome, GameStatus};
use crate::zones::{Zone, ZonePosition};

/// Everything an effect needs to know about the spell or ability running it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolveContext {
    pub controller: PlayerId,
    pub source_card: CardId,
    pub source_name: String,
    pub source_color: Option<Color>,
    pub source_permanent: Option<PermanentId>,
    /// Targets still legal at resolution.
    pub targets: SmallVec<[Target; 2]>,
    pub x_value: u32,
    pub event_player: Option<PlayerId>,
}

impl ResolveContext {
    #[must_use]
    pub fn target_source(&self) -> TargetSource {
        TargetSource {
            controller: self.controller,
            color: self.source_color,
        }
    }

    pub(crate) fn damage_source(&self, game: &GameData) -> DamageSource {
        let lifelink = self
            .source_permanent
            .is_some_and(|id| crate::continuous::has_keyword(game, id, Keywords::LIFELINK));
        DamageSource {
            name: self.source_name.clone(),
            color: self.source_color,
            controller: self.controller,
            lifelink,
            combat: false,
        }
    }

    /// Players a recipient resolves to, in APNAP order where it matters.
    #[must_use]
    pub fn players(&self, game: &GameData, recipient: Recipient) -> Vec<PlayerId> {
        match recipient {
            Recipient::Targets => self
                .targets
                .iter()
                .filter_map(|t| match t {
                    Target::Player(p) => Some(*p),
                    _ => None,
                })
                .collect(),
            Recipient::Controller => vec![self.controller],
            Recipient::EachOpponent => {
                let controller = self.controller;
                game.live_players_apnap().filter(|p| *p != controller).collect()
            }
            Recipient::EachPlayer => game.live_players_apnap().collect(),
            Recipient::EventPlayer => self.event_player.into_iter().collect(),
            Recipient::Player(p) => vec![p],
        }
    }

    /// Permanents a permanent effect acts on: its targets, or the source
    /// permanent when it has no targets at all.
    #[must_use]
    pub fn permanents(&self) -> Vec<PermanentId> {
        if self.targets.is_empty() {
            return self.source_permanent.into_iter().collect();
        }
        self.targets
            .iter()
            .filter_map(|t| match t {
                Target::Permanent(id) => Some(*id),
                _ => None,
            })
            .collect()
    }
}

/// What happens after the last effect ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Finish {
    Nothing,
    /// An instant or sorcery goes to its owner's graveyard.
    SpellToGraveyard(CardId),
}

/// A partially run effect list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Continuation {
    pub ctx: ResolveContext,
    pub remaining: Vec<Effect>,
    pub finish: Finish,
    /// Who receives priority once everything has run.
    pub priority_after: Option<PlayerId>,
    /// Run in order after this one completes.
    #[serde(default)]
    pub then: Vec<Continuation>,
}

impl Continuation {
    /// Chain `continuations` so they run front to back as one.
    #[must_use]
    pub fn chain(continuations: Vec<Continuation>) -> Option<Continuation> {
        let mut iter = continuations.into_iter();
        let mut first = iter.next()?;
        first.then.extend(iter);
        Some(first)
    }
}

/// Whether a run finished or stopped for input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Complete,
    Suspended,
}

enum Outcome {
    Done,
    /// Replace the current effect with these, run next.
    Expand(Vec<Effect>),
    Suspend { player: PlayerId, prompt: Prompt },
}

/// Run a continuation until it completes or needs input.
pub fn run_effects(
    game: &mut GameData,
    catalog: &EffectCatalog,
    continuation: Continuation,
) -> GameResult<Resolution> {
    let Continuation {
        ctx,
        remaining,
        finish,
        priority_after,
        then,
    } = continuation;
    let mut queue: VecDeque<Effect> = remaining.into();

    while let Some(effect) = queue.pop_front() {
        if game.is_finished() {
            break;
        }
        match execute(game, catalog, &ctx, &effect)? {
            Outcome::Done => {}
            Outcome::Expand(effects) => {
                for effect in effects.into_iter().rev() {
                    queue.push_front(effect);
                }
            }
            Outcome::Suspend { player, prompt } => {
                debug!(%player, kind = %prompt.kind(), source = %ctx.source_name, "resolution suspended");
                let continuation = Continuation {
                    ctx,
                    remaining: queue.into_iter().collect(),
                    finish,
                    priority_after,
                    then,
                };
                let input = AwaitingInput::new(game, player, prompt, Resume::Effects(Box::new(continuation)));
                game.awaiting = Some(input);
                return Ok(Resolution::Suspended);
            }
        }
    }

    if let Finish::SpellToGraveyard(card) = finish {
        if game.cards.contains(card) {
            game.move_card(card, Zone::Graveyard, ZonePosition::Top)?;
        }
    }
    if let Some(player) = priority_after {
        game.stack.give_priority(player);
    }
    match Continuation::chain(then) {
        Some(next) if !game.is_finished() => run_effects(game, catalog, next),
        _ => Ok(Resolution::Complete),
    }
}

/// Split a per-player prompt effect into one copy per player.
fn per_player(players: &[PlayerId], make: impl Fn(PlayerId) -> Effect) -> Outcome {
    Outcome::Expand(players.iter().map(|p| make(*p)).collect())
}

fn execute(
    game: &mut GameData,
    catalog: &EffectCatalog,
    ctx: &ResolveContext,
    effect: &Effect,
) -> GameResult<Outcome> {
    match effect {
        Effect::DealDamage { amount, to } => {
            let amount = amount.resolve(ctx.x_value);
            let source = ctx.damage_source(game);
            let recipients: Vec<DamageRecipient> = if *to == Recipient::Targets {
                ctx.targets
                    .iter()
                    .filter_map(|t| match t {
                        Target::Player(p) => Some(DamageRecipient::Player(*p)),
                        Target::Permanent(id) => Some(DamageRecipient::Permanent(*id)),
                        _ => None,
                    })
                    .collect()
            } else {
                ctx.players(game, *to)
                    .into_iter()
                    .map(DamageRecipient::Player)
                    .collect()
            };
            for recipient in recipients {
                deal_damage(game, &source, recipient, amount);
            }
        }

        Effect::GainLife { amount, to } => {
            let amount = amount.resolve(ctx.x_value);
            for player in ctx.players(game, *to) {
                game.player_mut(player).life += amount;
                game.log.push(format!("{player} gains {amount} life."));
            }
        }

        Effect::LoseLife { amount, to } => {
            let amount = amount.resolve(ctx.x_value);
            for player in ctx.players(game, *to) {
                game.player_mut(player).life -= amount;
                game.log.push(format!("{player} loses {amount} life."));
            }
        }

        Effect::DrawCards(count) => {
            let mut drawn = 0;
            for _ in 0..*count {
                if game.draw_card(ctx.controller).is_some() {
                    drawn += 1;
                }
            }
            game.log.push(format!("{} draws {} card(s).", ctx.controller, drawn));
        }

        Effect::Destroy { can_regenerate } => {
            for id in ctx.permanents() {
                rules::destroy_permanent(game, id, *can_regenerate)?;
            }
        }

        Effect::Tap | Effect::Untap => {
            let tapped = matches!(effect, Effect::Tap);
            for id in ctx.permanents() {
                if let Some(perm) = game.permanent_mut(id) {
                    perm.tapped = tapped;
                }
            }
        }

        Effect::Pump { power, toughness } => {
            for id in ctx.permanents() {
                if let Some(perm) = game.permanent_mut(id) {
                    perm.power_modifier += power;
                    perm.toughness_modifier += toughness;
                    let line = format!(
                        "{} gets {:+}/{:+} until end of turn.",
                        game.permanent_name(id),
                        power,
                        toughness
                    );
                    game.log.push(line);
                }
            }
        }

        Effect::GrantKeywords(keywords) => {
            for id in ctx.permanents() {
                if let Some(perm) = game.permanent_mut(id) {
                    perm.granted_keywords |= *keywords;
                }
            }
        }

        Effect::Regenerate => {
            for id in ctx.permanents() {
                if let Some(perm) = game.permanent_mut(id) {
                    perm.regeneration_shields += 1;
                    let line = format!("{} gains a regeneration shield.", game.permanent_name(id));
                    game.log.push(line);
                }
            }
        }

        Effect::GainControl { until_end_of_turn } => {
            for id in ctx.permanents() {
                let Some(current) = game.permanent(id).map(|p| p.controller) else {
                    continue;
                };
                if current == ctx.controller {
                    continue;
                }
                let original = game
                    .stolen
                    .get(&id)
                    .map_or(current, |s| s.original_controller);
                game.change_controller(id, ctx.controller)?;
                game.stolen.insert(
                    id,
                    StolenCreature {
                        original_controller: original,
                        source: ctx.source_permanent,
                        enchantment_dependent: false,
                        until_end_of_turn: *until_end_of_turn,
                    },
                );
                let line = format!("{} gains control of {}.", ctx.controller, game.permanent_name(id));
                game.log.push(line);
            }
        }

        Effect::ReturnToHand => {
            for id in ctx.permanents() {
                if game.is_on_battlefield(id) {
                    let name = game.permanent_name(id);
                    game.remove_permanent(id, Zone::Hand)?;
                    game.log.push(format!("{name} returns to its owner's hand."));
                }
            }
        }

        Effect::ReplaceLandWord { from, to } => {
            for id in ctx.permanents() {
                if let Some(perm) = game.permanent_mut(id) {
                    perm.text_replacements.retain(|(f, _)| f != from);
                    perm.text_replacements.push((*from, *to));
                }
            }
        }

        Effect::Equip => equip(game, ctx),

        Effect::PreventDamage(amount) => {
            for target in &ctx.targets {
                match *target {
                    Target::Player(player) => game.player_mut(player).prevention_shield += amount,
                    Target::Permanent(id) => match game.permanent_mut(id) {
                        Some(perm) => perm.prevention_shield += amount,
                        None => continue,
                    },
                    _ => continue,
                }
                let line = format!(
                    "The next {amount} damage that would be dealt to {} is prevented.",
                    describe(game, *target)
                );
                game.log.push(line);
            }
        }

        Effect::PreventNextDamage(amount) => {
            game.prevention.shield += amount;
            game.log.push(format!(
                "The next {amount} damage that would be dealt to any permanent or player is prevented."
            ));
        }

        Effect::PreventAllCombatDamage => {
            game.prevention.all_combat = true;
            game.log.push("All combat damage will be prevented this turn.");
        }

        Effect::PreventDamageFromColors(colors) => {
            for color in colors {
                if !game.prevention.from_colors.contains(color) {
                    game.prevention.from_colors.push(*color);
                }
            }
            let names: Vec<String> = colors.iter().map(|c| c.to_string().to_lowercase()).collect();
            game.log.push(format!(
                "All damage from {} sources will be prevented this turn.",
                names.join(" and ")
            ));
        }

        Effect::Counter => {
            for target in &ctx.targets {
                let Target::StackEntry(entry_id) = target else {
                    continue;
                };
                let Some(entry) = game.stack.remove(*entry_id) else {
                    continue;
                };
                game.log.push(format!("{} is countered.", entry.description()));
                if entry.kind.is_spell() {
                    game.move_card(entry.card.id, Zone::Graveyard, ZonePosition::Top)?;
                }
            }
        }

        Effect::CreateTokens { count, token } => {
            let count = count.resolve(ctx.x_value).max(0);
            create_tokens(game, ctx.controller, token, count as u32)?;
        }

        Effect::ExileTargetsCreateTokens { token } => {
            let mut exiled = 0;
            for target in &ctx.targets {
                let Target::Card { zone, card } = target else {
                    continue;
                };
                if game.is_in_zone(*card, ctx.controller, *zone) {
                    let name = game.card_name(*card);
                    game.move_card(*card, Zone::Exile, ZonePosition::Top)?;
                    game.log.push(format!("{name} is exiled."));
                    exiled += 1;
                }
            }
            create_tokens(game, ctx.controller, token, exiled)?;
        }

        Effect::Discard { count, who } => {
            let players = ctx.players(game, *who);
            if players.len() > 1 {
                let count = *count;
                return Ok(per_player(&players, |p| Effect::Discard {
                    count,
                    who: Recipient::Player(p),
                }));
            }
            let Some(player) = players.first().copied() else {
                return Ok(Outcome::Done);
            };
            if *count == 0 {
                return Ok(Outcome::Done);
            }
            if game.player(player).hand.is_empty() {
                game.log.push(format!("{player} has no cards to discard."));
                return Ok(Outcome::Done);
            }
            return Ok(Outcome::Suspend {
                player,
                prompt: Prompt::Discard { remaining: *count },
            });
        }

        Effect::ReturnFromGraveyard { filter, optional } => {
            if filter
                .cards_in(game, ctx.controller, Zone::Graveyard)
                .is_empty()
            {
                game.log.push(format!(
                    "{} has no valid card to return from the graveyard.",
                    ctx.controller
                ));
                return Ok(Outcome::Done);
            }
            return Ok(Outcome::Suspend {
                player: ctx.controller,
                prompt: Prompt::Graveyard {
                    filter: *filter,
                    optional: *optional,
                },
            });
        }

        Effect::ChooseColor => {
            if ctx.source_permanent.is_some_and(|id| game.is_on_battlefield(id)) {
                return Ok(Outcome::Suspend {
                    player: ctx.controller,
                    prompt: Prompt::Color,
                });
            }
            game.log.push(format!(
                "{} has no permanent to choose a colour for.",
                ctx.source_name
            ));
        }

        Effect::May { effect, prompt } => {
            return Ok(Outcome::Suspend {
                player: ctx.controller,
                prompt: Prompt::May {
                    description: prompt.clone(),
                    effect: effect.clone(),
                },
            });
        }

        Effect::SearchLibrary {
            filter,
            to_battlefield,
            can_fail,
        } => {
            if filter.cards_in(game, ctx.controller, Zone::Library).is_empty() {
                game.log.push(format!("{} searches and finds nothing.", ctx.controller));
                shuffle_library(game, ctx.controller);
                return Ok(Outcome::Done);
            }
            return Ok(Outcome::Suspend {
                player: ctx.controller,
                prompt: Prompt::LibrarySearch {
                    filter: *filter,
                    to_battlefield: *to_battlefield,
                    can_fail: *can_fail,
                },
            });
        }

        Effect::Sacrifice { filter, who } => {
            let players = ctx.players(game, *who);
            if players.len() > 1 {
                let filter = *filter;
                return Ok(per_player(&players, |p| Effect::Sacrifice {
                    filter,
                    who: Recipient::Player(p),
                }));
            }
            let Some(player) = players.first().copied() else {
                return Ok(Outcome::Done);
            };
            let any = game
                .player(player)
                .battlefield
                .iter()
                .any(|id| filter.matches(game, *id));
            if !any {
                game.log.push(format!("{player} has nothing to sacrifice."));
                return Ok(Outcome::Done);
            }
            return Ok(Outcome::Suspend {
                player,
                prompt: Prompt::Permanent { filter: *filter },
            });
        }

        Effect::WinIfLifeAtLeast(threshold) => {
            if game.player(ctx.controller).life >= *threshold {
                game.log.push(format!("{} wins the game.", ctx.controller));
                game.status = GameStatus::Finished(GameOutcome::Winner(ctx.controller));
            }
        }

        Effect::Custom(name) => {
            catalog.execute(name, game, ctx)?;
        }
    }
    Ok(Outcome::Done)
}

/// Attach the source equipment to the first still-legal target.
fn equip(game: &mut GameData, ctx: &ResolveContext) {
    let Some(equipment) = ctx.source_permanent.filter(|id| game.is_on_battlefield(*id)) else {
        game.log.push(format!(
            "{}'s equip ability fizzles (equipment no longer on the battlefield).",
            ctx.source_name
        ));
        return;
    };
    let Some(creature) = ctx.targets.iter().find_map(|t| match t {
        Target::Permanent(id) => Some(*id),
        _ => None,
    }) else {
        return;
    };
    if equipment == creature {
        return;
    }
    if let Some(perm) = game.permanent_mut(equipment) {
        perm.attached_to = Some(creature);
    }
    let line = format!(
        "{} is now attached to {}.",
        game.permanent_name(equipment),
        game.permanent_name(creature)
    );
    game.log.push(line);
}

/// Create `count` copies of a token under `controller`.
pub(crate) fn create_tokens(
    game: &mut GameData,
    controller: PlayerId,
    token: &crate::cards::CardDefinition,
    count: u32,
) -> GameResult<()> {
    if count == 0 {
        return Ok(());
    }
    for _ in 0..count {
        let card = game.create_token(token.clone(), controller);
        game.put_onto_battlefield(card, controller)?;
    }
    game.log.push(format!(
        "{} creates {} {} token(s).",
        controller, count, token.name
    ));
    Ok(())
}

pub(crate) fn shuffle_library(game: &mut GameData, player: PlayerId) {
    let mut library = std::mem::take(&mut game.player_mut(player).library);
    game.rng.shuffle_zone(&mut library);
    game.player_mut(player).library = library;
}

/// Log name of a target, for resolution messages.
pub(crate) fn target_names(game: &GameData, targets: &[Target]) -> String {
    targets
        .iter()
        .map(|t| describe(game, *t))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardDefinition;
    use crate::core::RulesConfig;
    use crate::effects::Amount;
    use crate::mana::ManaCost;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn ctx(game: &mut GameData, targets: &[Target]) -> ResolveContext {
        let card = game.add_card(P0, Zone::Hand, CardDefinition::sorcery("Test Spell", ManaCost::new(1)));
        ResolveContext {
            controller: P0,
            source_card: card,
            source_name: "Test Spell".into(),
            source_color: None,
            source_permanent: None,
            targets: targets.iter().copied().collect(),
            x_value: 3,
            event_player: None,
        }
    }

    fn run(game: &mut GameData, ctx: ResolveContext, effects: Vec<Effect>) -> Resolution {
        let continuation = Continuation {
            ctx,
            remaining: effects,
            finish: Finish::Nothing,
            priority_after: None,
            then: Vec::new(),
        };
        run_effects(game, &EffectCatalog::new(), continuation).unwrap()
    }

    #[test]
    fn test_x_damage_to_targets() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let ctx = ctx(&mut game, &[Target::Player(P1)]);
        let effect = Effect::DealDamage {
            amount: Amount::X,
            to: Recipient::Targets,
        };
        assert_eq!(run(&mut game, ctx, vec![effect]), Resolution::Complete);
        assert_eq!(game.player(P1).life, 17);
    }

    #[test]
    fn test_discard_suspends_with_rest() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        game.add_card(P1, Zone::Hand, CardDefinition::basic_land(crate::cards::Subtype::Island));
        let ctx = ctx(&mut game, &[Target::Player(P1)]);
        let effects = vec![Effect::discard(2, Recipient::Targets), Effect::DrawCards(1)];

        assert_eq!(run(&mut game, ctx, effects), Resolution::Suspended);
        let awaiting = game.awaiting.as_ref().unwrap();
        assert_eq!(awaiting.player, P1);
        assert_eq!(awaiting.prompt, Prompt::Discard { remaining: 2 });
        match &awaiting.resume {
            Resume::Effects(cont) => assert_eq!(cont.remaining, vec![Effect::DrawCards(1)]),
            other => panic!("unexpected resume {other:?}"),
        }
    }

    #[test]
    fn test_discard_from_empty_hand_is_vacuous() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let ctx = ctx(&mut game, &[]);
        let effects = vec![Effect::discard(1, Recipient::EachOpponent)];
        assert_eq!(run(&mut game, ctx, effects), Resolution::Complete);
        assert!(game.log.contains("Player 1 has no cards to discard."));
    }

    #[test]
    fn test_chained_continuations_survive_suspension() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let first = Continuation {
            ctx: ctx(&mut game, &[]),
            remaining: vec![Effect::may(Effect::gain_life(3), "Gain 3 life?")],
            finish: Finish::Nothing,
            priority_after: None,
            then: Vec::new(),
        };
        let second = Continuation {
            remaining: vec![Effect::gain_life(1)],
            ..first.clone()
        };
        let chain = Continuation::chain(vec![first, second]).unwrap();

        let result = run_effects(&mut game, &EffectCatalog::new(), chain).unwrap();
        assert_eq!(result, Resolution::Suspended);
        let Some(AwaitingInput {
            resume: Resume::Effects(cont),
            ..
        }) = game.awaiting.take()
        else {
            panic!("expected a may prompt");
        };
        assert_eq!(cont.then.len(), 1);

        run_effects(&mut game, &EffectCatalog::new(), *cont).unwrap();
        assert_eq!(game.player(P0).life, 21);
    }

    #[test]
    fn test_choose_color_without_permanent_is_logged() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let ctx = ctx(&mut game, &[]);
        assert_eq!(run(&mut game, ctx, vec![Effect::ChooseColor]), Resolution::Complete);
        assert!(game.awaiting.is_none());
        assert!(game.log.contains("Test Spell has no permanent to choose a colour for."));
    }

    #[test]
    fn test_equip_without_equipment_fizzles() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let bears = game.add_permanent(P0, CardDefinition::creature("Bears", ManaCost::new(1), 2, 2));
        let saw = game.add_permanent(
            P0,
            CardDefinition::equipment("Bone Saw", ManaCost::new(0), ManaCost::new(1)),
        );
        let mut ctx = ctx(&mut game, &[Target::Permanent(bears)]);
        ctx.source_name = "Bone Saw".into();
        ctx.source_permanent = Some(saw);
        game.remove_permanent(saw, Zone::Graveyard).unwrap();

        assert_eq!(run(&mut game, ctx, vec![Effect::Equip]), Resolution::Complete);
        assert!(game
            .log
            .contains("Bone Saw's equip ability fizzles (equipment no longer on the battlefield)."));
    }

    #[test]
    fn test_prevention_effects_set_shields() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let bears = game.add_permanent(P1, CardDefinition::creature("Bears", ManaCost::new(1), 2, 2));
        let ctx = ctx(&mut game, &[Target::Player(P1), Target::Permanent(bears)]);
        let effects = vec![
            Effect::PreventDamage(2),
            Effect::PreventNextDamage(1),
            Effect::PreventDamageFromColors(vec![Color::Red, Color::Green]),
        ];

        run(&mut game, ctx, effects);
        assert_eq!(game.player(P1).prevention_shield, 2);
        assert_eq!(game.permanent(bears).unwrap().prevention_shield, 2);
        assert_eq!(game.prevention.shield, 1);
        assert_eq!(game.prevention.from_colors.as_slice(), &[Color::Red, Color::Green]);
        assert!(game
            .log
            .contains("All damage from red and green sources will be prevented this turn."));
    }

    #[test]
    fn test_unknown_custom_handler_is_invariant() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let ctx = ctx(&mut game, &[]);
        let continuation = Continuation {
            ctx,
            remaining: vec![Effect::Custom("missing".into())],
            finish: Finish::Nothing,
            priority_after: None,
            then: Vec::new(),
        };
        let err = run_effects(&mut game, &EffectCatalog::new(), continuation).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_spell_goes_to_graveyard_on_finish() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let ctx = ctx(&mut game, &[]);
        let card = ctx.source_card;
        let continuation = Continuation {
            ctx,
            remaining: vec![Effect::gain_life(4)],
            finish: Finish::SpellToGraveyard(card),
            priority_after: Some(P1),
            then: Vec::new(),
        };
        run_effects(&mut game, &EffectCatalog::new(), continuation).unwrap();
        assert_eq!(game.player(P0).life, 24);
        assert!(game.is_in_zone(card, P0, Zone::Graveyard));
        assert_eq!(game.stack.priority_holder(), P1);
    }

    #[test]
    fn test_tokens_from_exiled_cards() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let bears = CardDefinition::creature("Bears", ManaCost::new(1), 2, 2);
        let a = game.add_card(P0, Zone::Graveyard, bears.clone());
        let b = game.add_card(P0, Zone::Graveyard, bears);
        let targets = [
            Target::Card { zone: Zone::Graveyard, card: a },
            Target::Card { zone: Zone::Graveyard, card: b },
        ];
        let ctx = ctx(&mut game, &targets);
        let zombie = CardDefinition::creature("Zombie", ManaCost::free(), 2, 2);
        let effects = vec![Effect::ExileTargetsCreateTokens {
            token: Box::new(zombie),
        }];

        run(&mut game, ctx, effects);
        assert_eq!(game.player(P0).exile.len(), 2);
        assert_eq!(game.player(P0).battlefield.len(), 2);
        assert!(game.log.contains("creates 2 Zombie token(s)."));
    }
}
