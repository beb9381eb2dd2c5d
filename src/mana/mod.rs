//! Mana costs, mana pools and the payment interface.
//!
//! Cost *strings* are not parsed here; costs are built in code. Payment is
//! a seam: the engine asks a [`ManaPayment`] implementation whether a cost
//! is payable and then asks it to consume the mana. [`StandardPayment`]
//! implements the usual rules (coloured symbols first, generic from
//! whatever is left, colourless preferred).
//!
//! ```
//! use ccg_rules::cards::Color;
//! use ccg_rules::mana::{ManaColor, ManaCost, ManaPayment, ManaPool, StandardPayment};
//!
//! let cost = ManaCost::new(2).with_colored(Color::Green, 1);
//! let mut pool = ManaPool::default();
//! pool.add(ManaColor::Green, 2);
//! pool.add(ManaColor::Colorless, 1);
//!
//! assert!(StandardPayment.can_pay(&pool, &cost, 0));
//! StandardPayment.pay(&mut pool, &cost, 0).unwrap();
//! assert_eq!(pool.total(), 0);
//! ```

use serde::{Deserialize, Serialize};

use crate::cards::Color;
use crate::core::RuleViolation;

/// A kind of mana in a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManaColor {
    Colored(Color),
    Colorless,
}

#[allow(non_upper_case_globals)]
impl ManaColor {
    pub const White: ManaColor = ManaColor::Colored(Color::White);
    pub const Blue: ManaColor = ManaColor::Colored(Color::Blue);
    pub const Black: ManaColor = ManaColor::Colored(Color::Black);
    pub const Red: ManaColor = ManaColor::Colored(Color::Red);
    pub const Green: ManaColor = ManaColor::Colored(Color::Green);

    const fn slot(self) -> usize {
        match self {
            ManaColor::Colored(color) => color.index(),
            ManaColor::Colorless => 5,
        }
    }
}

const SYMBOLS: [char; 5] = ['W', 'U', 'B', 'R', 'G'];

/// A mana cost: generic amount, coloured symbols, optional `{X}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaCost {
    pub generic: u32,
    /// Coloured symbol counts in WUBRG order.
    pub colored: [u32; 5],
    pub has_x: bool,
}

impl ManaCost {
    #[must_use]
    pub fn new(generic: u32) -> Self {
        Self {
            generic,
            ..Self::default()
        }
    }

    /// Zero cost.
    #[must_use]
    pub fn free() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_colored(mut self, color: Color, count: u32) -> Self {
        self.colored[color.index()] += count;
        self
    }

    #[must_use]
    pub fn with_x(mut self) -> Self {
        self.has_x = true;
        self
    }

    /// Converted mana value (X counts as zero).
    #[must_use]
    pub fn mana_value(&self) -> u32 {
        self.generic + self.colored.iter().sum::<u32>()
    }

    /// Total generic requirement once X is chosen. `None` when it doesn't
    /// fit in a `u32`.
    #[must_use]
    pub fn generic_with_x(&self, x: u32) -> Option<u32> {
        if self.has_x {
            self.generic.checked_add(x)
        } else {
            Some(self.generic)
        }
    }
}

impl std::fmt::Display for ManaCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_x {
            write!(f, "{{X}}")?;
        }
        if self.generic > 0 || (self.mana_value() == 0 && !self.has_x) {
            write!(f, "{{{}}}", self.generic)?;
        }
        for (symbol, &count) in SYMBOLS.iter().zip(self.colored.iter()) {
            for _ in 0..count {
                write!(f, "{{{symbol}}}")?;
            }
        }
        Ok(())
    }
}

/// Floating mana of one player. Emptied on every step change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    amounts: [u32; 6],
}

impl ManaPool {
    pub fn add(&mut self, color: ManaColor, amount: u32) {
        self.amounts[color.slot()] += amount;
    }

    #[must_use]
    pub fn get(&self, color: ManaColor) -> u32 {
        self.amounts[color.slot()]
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.amounts.iter().sum()
    }

    /// Empty the pool, returning how much was lost.
    pub fn drain(&mut self) -> u32 {
        let total = self.total();
        self.amounts = [0; 6];
        total
    }
}

/// Validator/consumer of mana payments.
pub trait ManaPayment: Send + Sync {
    /// Whether `cost` with the given X can be paid from `pool`.
    fn can_pay(&self, pool: &ManaPool, cost: &ManaCost, x: u32) -> bool;

    /// Remove the mana for `cost` from `pool`. Leaves the pool untouched on error.
    fn pay(&self, pool: &mut ManaPool, cost: &ManaCost, x: u32) -> Result<(), RuleViolation>;
}

/// Coloured symbols from matching mana, generic from colourless first,
/// then from coloured mana in WUBRG order.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardPayment;

impl ManaPayment for StandardPayment {
    fn can_pay(&self, pool: &ManaPool, cost: &ManaCost, x: u32) -> bool {
        let Some(generic) = cost.generic_with_x(x) else {
            return false;
        };
        let mut remaining = pool.amounts;
        for (slot, &needed) in cost.colored.iter().enumerate() {
            if remaining[slot] < needed {
                return false;
            }
            remaining[slot] -= needed;
        }
        remaining.iter().map(|n| u64::from(*n)).sum::<u64>() >= u64::from(generic)
    }

    fn pay(&self, pool: &mut ManaPool, cost: &ManaCost, x: u32) -> Result<(), RuleViolation> {
        if !self.can_pay(pool, cost, x) {
            return Err(RuleViolation::InsufficientMana(cost.to_string()));
        }
        for (slot, &needed) in cost.colored.iter().enumerate() {
            pool.amounts[slot] -= needed;
        }
        let Some(mut generic) = cost.generic_with_x(x) else {
            return Err(RuleViolation::InsufficientMana(cost.to_string()));
        };
        for slot in [5, 0, 1, 2, 3, 4] {
            let taken = generic.min(pool.amounts[slot]);
            pool.amounts[slot] -= taken;
            generic -= taken;
        }
        Ok(())
    }
}
