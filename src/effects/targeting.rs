//! Targets and target legality.
//!
//! A [`Target`] is an id plus enough context to find the object again:
//! a player, a permanent, a card in a zone, or a stack entry. Targets are
//! checked when chosen and again on resolution; anything that has moved
//! in between is illegal.

use serde::{Deserialize, Serialize};

use crate::cards::{CardDefinition, CardType, Color, Keywords, Subtype};
use crate::continuous;
use crate::core::{CardId, GameData, PermanentId, PlayerId, RuleViolation};
use crate::stack::StackEntryId;
use crate::zones::Zone;

/// Something a spell or ability can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Player(PlayerId),
    Permanent(PermanentId),
    /// A card in one of its owner's zones.
    Card { zone: Zone, card: CardId },
    StackEntry(StackEntryId),
}

/// How many targets a spec takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetCount {
    Exactly(u32),
    /// As many as the X paid.
    X,
}

impl TargetCount {
    #[must_use]
    pub fn resolve(self, x_value: u32) -> usize {
        match self {
            TargetCount::Exactly(n) => n as usize,
            TargetCount::X => x_value as usize,
        }
    }
}

/// Which permanents qualify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermanentFilter {
    Any,
    Creature,
    Artifact,
    Enchantment,
    Land,
    NonblackCreature,
    CreatureWithFlying,
    CreatureWithoutFlying,
}

impl PermanentFilter {
    #[must_use]
    pub fn matches(self, game: &GameData, id: PermanentId) -> bool {
        let Some(c) = continuous::characteristics(game, id) else {
            return false;
        };
        match self {
            PermanentFilter::Any => true,
            PermanentFilter::Creature => c.is_creature(),
            PermanentFilter::Artifact => c.has_type(CardType::Artifact),
            PermanentFilter::Enchantment => c.has_type(CardType::Enchantment),
            PermanentFilter::Land => c.has_type(CardType::Land),
            PermanentFilter::NonblackCreature => c.is_creature() && c.color != Some(Color::Black),
            PermanentFilter::CreatureWithFlying => {
                c.is_creature() && c.keywords.contains(Keywords::FLYING)
            }
            PermanentFilter::CreatureWithoutFlying => {
                c.is_creature() && !c.keywords.contains(Keywords::FLYING)
            }
        }
    }
}

/// Which cards (outside the battlefield) qualify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardFilter {
    Any,
    Creature,
    Land,
    Subtype(Subtype),
}

impl CardFilter {
    #[must_use]
    pub fn matches(self, def: &CardDefinition) -> bool {
        match self {
            CardFilter::Any => true,
            CardFilter::Creature => def.is_creature_card(),
            CardFilter::Land => def.has_type(CardType::Land),
            CardFilter::Subtype(subtype) => def.has_subtype(subtype),
        }
    }

    /// Cards in `player`'s `zone` that match, in zone order.
    #[must_use]
    pub fn cards_in(self, game: &GameData, player: PlayerId, zone: Zone) -> Vec<CardId> {
        game.zone_cards(player, zone)
            .map(|cards| {
                cards
                    .iter()
                    .copied()
                    .filter(|id| game.cards.get(*id).is_some_and(|c| self.matches(&c.def)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// What a spell or ability targets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSpec {
    #[default]
    None,
    /// A creature or a player.
    AnyTarget,
    Player,
    Permanent(PermanentFilter),
    /// A permanent the controller controls.
    OwnPermanent(PermanentFilter),
    /// A spell on the stack.
    Spell,
    /// Cards in the controller's own graveyard.
    GraveyardCards { filter: CardFilter, count: TargetCount },
}

impl TargetSpec {
    /// Number of targets required for the given X.
    #[must_use]
    pub fn count(&self, x_value: u32) -> usize {
        match self {
            TargetSpec::None => 0,
            TargetSpec::GraveyardCards { count, .. } => count.resolve(x_value),
            _ => 1,
        }
    }

    #[must_use]
    pub fn is_targeted(&self) -> bool {
        !matches!(self, TargetSpec::None)
    }
}

/// Who is doing the targeting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetSource {
    pub controller: PlayerId,
    pub color: Option<Color>,
}

fn permanent_targetable(game: &GameData, id: PermanentId, source: TargetSource) -> bool {
    game.is_on_battlefield(id)
        && !continuous::has_keyword(game, id, Keywords::SHROUD)
        && !continuous::has_protection_from(game, id, source.color)
}

/// Whether `target` is currently legal for `spec`.
#[must_use]
pub fn is_legal(game: &GameData, spec: &TargetSpec, target: Target, source: TargetSource) -> bool {
    match (spec, target) {
        (TargetSpec::AnyTarget | TargetSpec::Player, Target::Player(player)) => {
            game.players.contains(player) && !game.player(player).has_lost
        }
        (TargetSpec::AnyTarget, Target::Permanent(id)) => {
            continuous::is_creature(game, id) && permanent_targetable(game, id, source)
        }
        (TargetSpec::Permanent(filter), Target::Permanent(id)) => {
            filter.matches(game, id) && permanent_targetable(game, id, source)
        }
        (TargetSpec::OwnPermanent(filter), Target::Permanent(id)) => {
            continuous::controller_of(game, id) == Some(source.controller)
                && filter.matches(game, id)
                && permanent_targetable(game, id, source)
        }
        (TargetSpec::Spell, Target::StackEntry(id)) => {
            game.stack.get(id).is_some_and(|entry| entry.kind.is_spell())
        }
        (TargetSpec::GraveyardCards { filter, .. }, Target::Card { zone, card }) => {
            zone == Zone::Graveyard
                && game.is_in_zone(card, source.controller, Zone::Graveyard)
                && game.cards.get(card).is_some_and(|c| filter.matches(&c.def))
        }
        _ => false,
    }
}

/// Every currently legal single target for `spec`.
#[must_use]
pub fn legal_targets(game: &GameData, spec: &TargetSpec, source: TargetSource) -> Vec<Target> {
    let mut candidates: Vec<Target> = Vec::new();
    match spec {
        TargetSpec::None => {}
        TargetSpec::AnyTarget | TargetSpec::Player | TargetSpec::Permanent(_) | TargetSpec::OwnPermanent(_) => {
            candidates.extend(game.players.player_ids().map(Target::Player));
            candidates.extend(game.all_permanents().map(Target::Permanent));
        }
        TargetSpec::Spell => candidates.extend(game.stack.iter().map(|e| Target::StackEntry(e.id))),
        TargetSpec::GraveyardCards { filter, .. } => {
            candidates.extend(
                filter
                    .cards_in(game, source.controller, Zone::Graveyard)
                    .into_iter()
                    .map(|card| Target::Card {
                        zone: Zone::Graveyard,
                        card,
                    }),
            );
        }
    }
    candidates.retain(|t| is_legal(game, spec, *t, source));
    candidates
}

/// Validate a full target selection made while casting or activating.
pub fn validate_targets(
    game: &GameData,
    spec: &TargetSpec,
    targets: &[Target],
    x_value: u32,
    source: TargetSource,
) -> Result<(), RuleViolation> {
    let required = spec.count(x_value);
    if targets.len() != required {
        return Err(RuleViolation::IllegalTarget(format!(
            "expected {required} target(s), got {}",
            targets.len()
        )));
    }
    for (i, target) in targets.iter().enumerate() {
        if targets[..i].contains(target) {
            return Err(RuleViolation::IllegalTarget(format!(
                "{} chosen more than once",
                describe(game, *target)
            )));
        }
        if !is_legal(game, spec, *target, source) {
            return Err(RuleViolation::IllegalTarget(describe(game, *target)));
        }
    }
    Ok(())
}

/// Human-readable name of a target.
#[must_use]
pub fn describe(game: &GameData, target: Target) -> String {
    match target {
        Target::Player(player) => player.to_string(),
        Target::Permanent(id) => game.permanent_name(id),
        Target::Card { card, .. } => game.card_name(card),
        Target::StackEntry(id) => game
            .stack
            .get(id)
            .map_or_else(|| id.to_string(), |e| e.description()),
    }
}
