//! Card arena.
//!
//! Every card of a game, including tokens and cards currently on the
//! stack, lives in the `CardRegistry` keyed by [`CardId`]. Zones hold ids
//! only. Tokens are removed from the registry when they leave the
//! battlefield; everything else stays for the whole game.

use im::OrdMap;
use serde::{Deserialize, Serialize};

use super::definition::Card;
use crate::core::CardId;

/// Id-indexed card storage.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CardRegistry {
    cards: OrdMap<CardId, Card>,
}

impl CardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a card, replacing any card with the same id.
    pub fn insert(&mut self, card: Card) {
        self.cards.insert(card.id, card);
    }

    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    /// Remove a card (a token ceasing to exist).
    pub fn remove(&mut self, id: CardId) -> Option<Card> {
        self.cards.remove(&id)
    }

    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all cards in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardDefinition;
    use crate::core::PlayerId;
    use crate::mana::ManaCost;

    #[test]
    fn test_insert_get_remove() {
        let mut registry = CardRegistry::new();
        let token = Card::token(
            CardId::new(3),
            PlayerId::new(1),
            CardDefinition::creature("Zombie", ManaCost::free(), 2, 2),
        );
        registry.insert(token);

        assert_eq!(registry.len(), 1);
        assert!(registry.get(CardId::new(3)).is_some_and(|c| c.is_token));

        let removed = registry.remove(CardId::new(3));
        assert_eq!(removed.map(|c| c.def.name), Some("Zombie".to_string()));
        assert!(registry.is_empty());
    }
}
