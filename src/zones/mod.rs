//! Zones and zone transitions.
//!
//! Each player owns a hand, library, graveyard and exile, all ordered
//! sequences of [`CardId`](crate::core::CardId). The battlefield is held as
//! per-controller ordered lists of permanent ids. The stack zone is the
//! [`PriorityStack`](crate::stack::PriorityStack) itself.
//!
//! A card moving between zones keeps its `CardId`; a card entering the
//! battlefield gets a fresh `PermanentId` every time.

pub mod manager;

use serde::{Deserialize, Serialize};
use strum::Display;

/// A zone kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Zone {
    Hand,
    Library,
    Graveyard,
    Exile,
    Battlefield,
    Stack,
}

/// Where a card lands in an ordered zone.
///
/// For libraries `Top` is the next card drawn. For every other zone `Top`
/// is the most recently added end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    Top,
    Bottom,
    /// Index from the top.
    Index(usize),
}
