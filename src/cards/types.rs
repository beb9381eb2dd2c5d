//! Card types, colours, subtypes and keywords.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Card type. A card may carry several (artifact creature).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum CardType {
    Creature,
    Instant,
    Sorcery,
    Enchantment,
    Artifact,
    Land,
}

impl CardType {
    /// Whether a card of this type stays on the battlefield when it resolves.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }
}

/// The five colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    /// Position in WUBRG order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Subtypes the rules core needs to recognise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Subtype {
    // Land types (landwalk, land-count formulas)
    Plains,
    Island,
    Swamp,
    Mountain,
    Forest,

    // Attachments
    Aura,
    Equipment,

    // Creature types
    Angel,
    Bear,
    Beast,
    Elf,
    Goblin,
    Human,
    Knight,
    Lhurgoyf,
    Rhino,
    Soldier,
    Spirit,
    Wall,
    Wizard,
    Zombie,
}

bitflags! {
    /// Keyword abilities, as a set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Keywords: u32 {
        const FLYING         = 1 << 0;
        const REACH          = 1 << 1;
        const FIRST_STRIKE   = 1 << 2;
        const DOUBLE_STRIKE  = 1 << 3;
        const TRAMPLE        = 1 << 4;
        const VIGILANCE      = 1 << 5;
        const HASTE          = 1 << 6;
        const DEFENDER       = 1 << 7;
        const LIFELINK       = 1 << 8;
        const FEAR           = 1 << 9;
        /// Can't be blocked except by two or more creatures.
        const MENACE         = 1 << 10;
        const SHROUD         = 1 << 11;
        const UNBLOCKABLE    = 1 << 12;
        const PLAINSWALK     = 1 << 13;
        const ISLANDWALK     = 1 << 14;
        const SWAMPWALK      = 1 << 15;
        const MOUNTAINWALK   = 1 << 16;
        const FORESTWALK     = 1 << 17;
    }
}

impl Keywords {
    /// Landwalk keywords paired with the land subtype they look for.
    pub const LANDWALKS: [(Keywords, Subtype); 5] = [
        (Keywords::PLAINSWALK, Subtype::Plains),
        (Keywords::ISLANDWALK, Subtype::Island),
        (Keywords::SWAMPWALK, Subtype::Swamp),
        (Keywords::MOUNTAINWALK, Subtype::Mountain),
        (Keywords::FORESTWALK, Subtype::Forest),
    ];
}
