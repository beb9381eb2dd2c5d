//! Snapshots pushed to connected clients after each mutation.
//!
//! A snapshot is the whole store plus the effective characteristics of
//! every permanent at capture time, so a client never has to run the
//! layer system itself. `GameData` is persistent, so capturing is cheap.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::continuous::{self, Characteristics};
use crate::core::{GameData, PermanentId};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode snapshot: {0}")]
    Decode(#[source] bincode::Error),
}

/// The game as a client sees it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub data: GameData,
    /// Effective characteristics, in battlefield order (APNAP).
    pub characteristics: Vec<(PermanentId, Characteristics)>,
}

impl GameSnapshot {
    #[must_use]
    pub fn capture(game: &GameData) -> Self {
        let characteristics = game
            .permanents_apnap()
            .into_iter()
            .filter_map(|id| continuous::characteristics(game, id).map(|c| (id, c)))
            .collect();
        Self {
            data: game.clone(),
            characteristics,
        }
    }

    /// Effective characteristics of one permanent at capture time.
    #[must_use]
    pub fn characteristics_of(&self, id: PermanentId) -> Option<&Characteristics> {
        self.characteristics
            .iter()
            .find_map(|(pid, c)| (*pid == id).then_some(c))
    }

    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(SnapshotError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        bincode::deserialize(bytes).map_err(SnapshotError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, Subtype};
    use crate::continuous::{Scope, StaticEffect};
    use crate::core::{PlayerId, RulesConfig};
    use crate::mana::ManaCost;

    const P0: PlayerId = PlayerId::new(0);

    #[test]
    fn test_capture_includes_effective_stats() {
        let mut game = GameData::new(RulesConfig::default()).unwrap();
        let bears = game.add_permanent(P0, CardDefinition::creature("Grizzly Bears", ManaCost::new(2), 2, 2));
        game.add_permanent(
            P0,
            CardDefinition::enchantment("Crusade", ManaCost::new(2)).with_static(StaticEffect::Boost {
                power: 1,
                toughness: 1,
                scope: Scope::OwnCreatures,
            }),
        );
        game.add_permanent(P0, CardDefinition::basic_land(Subtype::Forest));

        let snapshot = GameSnapshot::capture(&game);
        assert_eq!(snapshot.characteristics.len(), 3);
        let stats = snapshot.characteristics_of(bears).unwrap();
        assert_eq!((stats.power, stats.toughness), (Some(3), Some(3)));
    }

    #[test]
    fn test_bincode_round_trip() {
        let mut game = GameData::new(RulesConfig::default().with_seed(5)).unwrap();
        let bears = game.add_permanent(P0, CardDefinition::creature("Grizzly Bears", ManaCost::new(2), 2, 2));
        game.log.push("Grizzly Bears enters the battlefield under Player 0's control.");

        let bytes = GameSnapshot::capture(&game).encode().unwrap();
        let back = GameSnapshot::decode(&bytes).unwrap();
        assert!(back.data.is_on_battlefield(bears));
        assert_eq!(back.data.log, game.log);
        assert_eq!(back.characteristics_of(bears).unwrap().power, Some(2));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(GameSnapshot::decode(&[0xff, 0x01]), Err(SnapshotError::Decode(_))));
    }
}
