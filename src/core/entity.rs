//! Object identification.
//!
//! Cards and permanents are separate objects with separate ids. A card is
//! the physical object that moves between zones; a permanent is the
//! battlefield wrapper created each time a card enters the battlefield.
//!
//! ## ID Layout
//!
//! Both id kinds are drawn from one monotonically increasing counter, so a
//! raw value is never reused within a game. A card that leaves and re-enters
//! the battlefield gets a fresh `PermanentId`; anything still holding the
//! old id (a stack target, a blocker list) simply fails to resolve it.
//!
//! ```
//! use ccg_rules::core::IdAllocator;
//!
//! let mut ids = IdAllocator::default();
//! let card = ids.next_card();
//! let first = ids.next_permanent();
//! let second = ids.next_permanent();
//!
//! assert_ne!(first, second);
//! assert!(card.raw() < first.raw());
//! ```

use serde::{Deserialize, Serialize};

/// Stable identifier of a card (including tokens) for the whole game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a card id from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Identifier of one battlefield incarnation of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermanentId(pub u32);

impl PermanentId {
    /// Create a permanent id from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PermanentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Permanent({})", self.0)
    }
}

/// Hands out card and permanent ids from a single counter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Allocate a fresh card id.
    pub fn next_card(&mut self) -> CardId {
        CardId(self.bump())
    }

    /// Allocate a fresh permanent id.
    pub fn next_permanent(&mut self) -> PermanentId {
        PermanentId(self.bump())
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.next
    }

    fn bump(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}
