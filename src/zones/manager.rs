//! Zone transitions on the game store.
//!
//! Every movement of a card between zones goes through the methods here so
//! that the side effects of a zone change happen in one place:
//!
//! - a card leaving the battlefield destroys its `Permanent`, drops it from
//!   combat and from the stolen-creature table, and queues its dies
//!   triggers when a creature goes to a graveyard,
//! - a card entering the battlefield becomes a new `Permanent` with a fresh
//!   id and queues its enters-the-battlefield triggers,
//! - a token that ends up anywhere but the battlefield ceases to exist.
//!
//! Cards always go to their *owner's* zones; only the battlefield is
//! arranged by controller.

use im::Vector;
use tracing::debug;

use super::{Zone, ZonePosition};
use crate::cards::{CardDefinition, Permanent};
use crate::continuous;
use crate::core::{CardId, GameData, InvariantViolation, PermanentId, PlayerId};
use crate::triggers::{self, GameEvent};

fn insert_at(cards: &mut Vector<CardId>, card: CardId, zone: Zone, position: ZonePosition) {
    // Libraries keep the top at index 0, every other zone at the back.
    let top_is_front = zone == Zone::Library;
    match (position, top_is_front) {
        (ZonePosition::Top, true) | (ZonePosition::Bottom, false) => cards.push_front(card),
        (ZonePosition::Top, false) | (ZonePosition::Bottom, true) => cards.push_back(card),
        (ZonePosition::Index(i), true) => cards.insert(i.min(cards.len()), card),
        (ZonePosition::Index(i), false) => {
            let at = cards.len().saturating_sub(i);
            cards.insert(at, card);
        }
    }
}

impl GameData {
    /// Cards in one of `player`'s card zones.
    ///
    /// The battlefield and the stack hold no bare cards, so they return
    /// `None`.
    #[must_use]
    pub fn zone_cards(&self, player: PlayerId, zone: Zone) -> Option<&Vector<CardId>> {
        let state = self.player(player);
        match zone {
            Zone::Hand => Some(&state.hand),
            Zone::Library => Some(&state.library),
            Zone::Graveyard => Some(&state.graveyard),
            Zone::Exile => Some(&state.exile),
            Zone::Battlefield | Zone::Stack => None,
        }
    }

    fn zone_cards_mut(&mut self, player: PlayerId, zone: Zone) -> Option<&mut Vector<CardId>> {
        let state = self.player_mut(player);
        match zone {
            Zone::Hand => Some(&mut state.hand),
            Zone::Library => Some(&mut state.library),
            Zone::Graveyard => Some(&mut state.graveyard),
            Zone::Exile => Some(&mut state.exile),
            Zone::Battlefield | Zone::Stack => None,
        }
    }

    /// Whether `card` is currently in `player`'s `zone`.
    #[must_use]
    pub fn is_in_zone(&self, card: CardId, player: PlayerId, zone: Zone) -> bool {
        self.zone_cards(player, zone)
            .is_some_and(|cards| cards.contains(&card))
    }

    /// Find which player's card zone holds `card`.
    #[must_use]
    pub fn locate_card(&self, card: CardId) -> Option<(PlayerId, Zone)> {
        const ZONES: [Zone; 4] = [Zone::Hand, Zone::Library, Zone::Graveyard, Zone::Exile];
        self.players.player_ids().find_map(|player| {
            ZONES
                .iter()
                .find(|zone| self.is_in_zone(card, player, **zone))
                .map(|zone| (player, *zone))
        })
    }

    /// Take `card` out of whatever card zone it is in. Returns whether it was found.
    fn detach_card(&mut self, card: CardId) -> bool {
        let Some((player, zone)) = self.locate_card(card) else {
            return false;
        };
        if let Some(cards) = self.zone_cards_mut(player, zone) {
            cards.retain(|c| *c != card);
        }
        true
    }

    /// Create a card and put it into `player`'s `zone`.
    ///
    /// Setup helper for decks and scenarios. For the battlefield use
    /// [`add_permanent`](Self::add_permanent).
    pub fn add_card(&mut self, player: PlayerId, zone: Zone, definition: CardDefinition) -> CardId {
        let card = self.create_card(definition, player);
        if let Some(cards) = self.zone_cards_mut(player, zone) {
            insert_at(cards, card, zone, ZonePosition::Top);
        }
        card
    }

    /// Create a card directly on `controller`'s battlefield.
    ///
    /// Setup helper: the permanent is treated as having been controlled
    /// since the start of the turn (no summoning sickness) and no triggers
    /// fire.
    pub fn add_permanent(&mut self, controller: PlayerId, definition: CardDefinition) -> PermanentId {
        let card = self.create_card(definition, controller);
        let id = self.ids.next_permanent();
        let mut permanent = Permanent::new(id, card, controller);
        permanent.summoning_sick = false;
        self.permanents.insert(id, permanent);
        self.player_mut(controller).battlefield.push_back(id);
        id
    }

    /// Move a card from its current card zone into its owner's `to` zone.
    ///
    /// A card that is in no zone (on the stack, or just created) is simply
    /// placed. Tokens moved anywhere cease to exist.
    pub fn move_card(
        &mut self,
        card: CardId,
        to: Zone,
        position: ZonePosition,
    ) -> Result<(), InvariantViolation> {
        let (owner, is_token) = {
            let c = self.card(card)?;
            (c.owner, c.is_token)
        };
        self.detach_card(card);

        if is_token {
            self.cards.remove(card);
            return Ok(());
        }
        if let Some(cards) = self.zone_cards_mut(owner, to) {
            insert_at(cards, card, to, position);
        }
        debug!(%card, %owner, zone = %to, "card moved");
        Ok(())
    }

    /// Put `card` onto the battlefield under `controller`'s control.
    ///
    /// The card leaves whatever zone it was in. The new permanent is
    /// summoning sick and its enters-the-battlefield triggers are queued.
    pub fn put_onto_battlefield(
        &mut self,
        card: CardId,
        controller: PlayerId,
    ) -> Result<PermanentId, InvariantViolation> {
        self.card(card)?;
        self.detach_card(card);

        let id = self.ids.next_permanent();
        self.permanents.insert(id, Permanent::new(id, card, controller));
        self.player_mut(controller).battlefield.push_back(id);
        debug!(%card, permanent = %id, %controller, "permanent entered");

        triggers::raise(self, &GameEvent::EntersBattlefield { permanent: id })?;
        Ok(id)
    }

    /// Remove a permanent from the battlefield into its owner's `to` zone.
    ///
    /// Returns the card it wrapped. Auras and equipment attached to it stay
    /// where they are; state-based actions deal with them.
    pub fn remove_permanent(&mut self, id: PermanentId, to: Zone) -> Result<CardId, InvariantViolation> {
        let was_creature = continuous::is_creature(self, id);
        let permanent = self
            .permanents
            .remove(&id)
            .ok_or(InvariantViolation::MissingPermanent(id))?;

        self.player_mut(permanent.controller)
            .battlefield
            .retain(|p| *p != id);
        self.stolen.remove(&id);
        self.combat.forget(id);

        if to == Zone::Graveyard && was_creature {
            triggers::raise(
                self,
                &GameEvent::Dies {
                    card: permanent.card,
                    controller: permanent.controller,
                    permanent: id,
                },
            )?;
        }

        self.move_card(permanent.card, to, ZonePosition::Top)?;
        Ok(permanent.card)
    }

    /// Hand a permanent to a new controller, keeping its battlefield entry.
    pub fn change_controller(
        &mut self,
        id: PermanentId,
        new_controller: PlayerId,
    ) -> Result<(), InvariantViolation> {
        let permanent = self
            .permanents
            .get_mut(&id)
            .ok_or(InvariantViolation::MissingPermanent(id))?;
        let old = permanent.controller;
        if old == new_controller {
            return Ok(());
        }
        permanent.controller = new_controller;
        permanent.summoning_sick = true;
        permanent.remove_from_combat();

        self.player_mut(old).battlefield.retain(|p| *p != id);
        self.player_mut(new_controller).battlefield.push_back(id);
        self.combat.forget(id);
        Ok(())
    }

    /// Draw the top card of `player`'s library into their hand.
    ///
    /// Drawing from an empty library marks the player; they lose at the
    /// next state-based action check.
    pub fn draw_card(&mut self, player: PlayerId) -> Option<CardId> {
        let state = self.player_mut(player);
        match state.library.pop_front() {
            Some(card) => {
                state.hand.push_back(card);
                Some(card)
            }
            None => {
                state.drew_from_empty_library = true;
                None
            }
        }
    }

    /// Index of a permanent on its controller's battlefield.
    #[must_use]
    pub fn battlefield_index(&self, id: PermanentId) -> Option<usize> {
        let controller = self.permanent(id)?.controller;
        self.player(controller).battlefield.index_of(&id)
    }
}
