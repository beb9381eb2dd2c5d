//! Suspended player decisions.
//!
//! When something needs an answer only one player can give, the engine
//! stores an [`AwaitingInput`] on the game and returns. The descriptor
//! says who is being asked, what kind of answer is expected, which
//! answers are valid right now, and how to pick up where the engine left
//! off ([`Resume`]). Nothing blocks while waiting.
//!
//! [`submit_choice`] checks an answer against the game as it is *now*,
//! applies it and resumes.

mod submit;

use serde::{Deserialize, Serialize};
use strum::{Display, IntoEnumIterator};

use crate::cards::Color;
use crate::combat::PendingCombatDamage;
use crate::core::{CardId, GameData, PermanentId, PlayerId};
use crate::effects::{CardFilter, Continuation, DamageRecipient, Effect, PermanentFilter};
use crate::rules;
use crate::stack::casting::PendingCast;
use crate::zones::Zone;

pub use submit::submit_choice;

/// The kinds of decision a player can be asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ChoiceKind {
    Discard,
    Graveyard,
    MultiGraveyard,
    Color,
    Permanent,
    May,
    LibrarySearch,
    CombatDamage,
}

/// What the prompted player is being asked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Prompt {
    /// Discard one card; `remaining` includes this one.
    Discard { remaining: u32 },
    /// Return a card from your graveyard to your hand.
    Graveyard { filter: CardFilter, optional: bool },
    /// Choose exactly `count` cards from your graveyard as targets.
    MultiGraveyard { filter: CardFilter, count: u32 },
    Color,
    /// "You may ...".
    May { description: String, effect: Box<Effect> },
    /// Choose a permanent you control (to sacrifice).
    Permanent { filter: PermanentFilter },
    /// Choose which legendary permanent named `name` to keep.
    LegendRule { name: String, candidates: Vec<PermanentId> },
    LibrarySearch {
        filter: CardFilter,
        to_battlefield: bool,
        can_fail: bool,
    },
    /// Split `amount` combat damage among `recipients`.
    CombatDamage {
        attacker: PermanentId,
        amount: u32,
        recipients: Vec<DamageRecipient>,
    },
}

impl Prompt {
    #[must_use]
    pub fn kind(&self) -> ChoiceKind {
        match self {
            Prompt::Discard { .. } => ChoiceKind::Discard,
            Prompt::Graveyard { .. } => ChoiceKind::Graveyard,
            Prompt::MultiGraveyard { .. } => ChoiceKind::MultiGraveyard,
            Prompt::Color => ChoiceKind::Color,
            Prompt::May { .. } => ChoiceKind::May,
            Prompt::Permanent { .. } | Prompt::LegendRule { .. } => ChoiceKind::Permanent,
            Prompt::LibrarySearch { .. } => ChoiceKind::LibrarySearch,
            Prompt::CombatDamage { .. } => ChoiceKind::CombatDamage,
        }
    }

    /// The answers currently valid for `player`.
    #[must_use]
    pub fn options(&self, game: &GameData, player: PlayerId) -> ChoiceSet {
        match self {
            Prompt::Discard { .. } => ChoiceSet::Cards(game.player(player).hand.iter().copied().collect()),
            Prompt::Graveyard { filter, .. } | Prompt::MultiGraveyard { filter, .. } => {
                ChoiceSet::Cards(filter.cards_in(game, player, Zone::Graveyard))
            }
            Prompt::LibrarySearch { filter, .. } => ChoiceSet::Cards(filter.cards_in(game, player, Zone::Library)),
            Prompt::Color => ChoiceSet::Colors(Color::iter().collect()),
            Prompt::May { .. } => ChoiceSet::YesNo,
            Prompt::Permanent { filter } => ChoiceSet::Permanents(
                game.player(player)
                    .battlefield
                    .iter()
                    .copied()
                    .filter(|id| filter.matches(game, *id))
                    .collect(),
            ),
            Prompt::LegendRule { name, candidates } => ChoiceSet::Permanents(
                candidates
                    .iter()
                    .copied()
                    .filter(|id| {
                        game.permanent(*id).is_some_and(|p| p.controller == player)
                            && rules::legend::is_legend_named(game, *id, name)
                    })
                    .collect(),
            ),
            Prompt::CombatDamage { recipients, .. } => ChoiceSet::Recipients(
                recipients
                    .iter()
                    .copied()
                    .filter(|r| match r {
                        DamageRecipient::Player(_) => true,
                        DamageRecipient::Permanent(id) => game.is_on_battlefield(*id),
                    })
                    .collect(),
            ),
        }
    }
}

/// The valid answers to a prompt at one point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceSet {
    Cards(Vec<CardId>),
    Permanents(Vec<PermanentId>),
    Colors(Vec<Color>),
    YesNo,
    Recipients(Vec<DamageRecipient>),
}

impl ChoiceSet {
    /// Number of distinct answers (`2` for yes/no).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ChoiceSet::Cards(cards) => cards.len(),
            ChoiceSet::Permanents(ids) => ids.len(),
            ChoiceSet::Colors(colors) => colors.len(),
            ChoiceSet::YesNo => 2,
            ChoiceSet::Recipients(recipients) => recipients.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains_card(&self, card: CardId) -> bool {
        matches!(self, ChoiceSet::Cards(cards) if cards.contains(&card))
    }

    #[must_use]
    pub fn contains_permanent(&self, id: PermanentId) -> bool {
        matches!(self, ChoiceSet::Permanents(ids) if ids.contains(&id))
    }
}

/// Where the engine picks up once the answer is in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Resume {
    /// The rest of a spell's or ability's effects.
    Effects(Box<Continuation>),
    /// A spell waiting for its targets.
    Cast(Box<PendingCast>),
    /// A combat damage step waiting for damage splits.
    Combat(Box<PendingCombatDamage>),
    /// The cleanup step's hand-size discard.
    Cleanup,
    /// Nothing is paused; the game loop carries on.
    Settle,
}

/// A pending decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AwaitingInput {
    pub player: PlayerId,
    pub prompt: Prompt,
    /// Valid answers when the prompt was issued. Submissions are checked
    /// against a fresh set.
    pub options: ChoiceSet,
    pub resume: Resume,
}

impl AwaitingInput {
    #[must_use]
    pub fn new(game: &GameData, player: PlayerId, prompt: Prompt, resume: Resume) -> Self {
        let options = prompt.options(game, player);
        Self {
            player,
            prompt,
            options,
            resume,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ChoiceKind {
        self.prompt.kind()
    }
}

/// A player's answer. One variant per [`ChoiceKind`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    Discard(CardId),
    /// `None` declines an optional return.
    Graveyard(Option<CardId>),
    MultiGraveyard(Vec<CardId>),
    Color(Color),
    Permanent(PermanentId),
    May(bool),
    /// `None` fails to find.
    LibrarySearch(Option<CardId>),
    CombatDamage(Vec<(DamageRecipient, u32)>),
}

impl Choice {
    #[must_use]
    pub fn kind(&self) -> ChoiceKind {
        match self {
            Choice::Discard(_) => ChoiceKind::Discard,
            Choice::Graveyard(_) => ChoiceKind::Graveyard,
            Choice::MultiGraveyard(_) => ChoiceKind::MultiGraveyard,
            Choice::Color(_) => ChoiceKind::Color,
            Choice::Permanent(_) => ChoiceKind::Permanent,
            Choice::May(_) => ChoiceKind::May,
            Choice::LibrarySearch(_) => ChoiceKind::LibrarySearch,
            Choice::CombatDamage(_) => ChoiceKind::CombatDamage,
        }
    }
}
