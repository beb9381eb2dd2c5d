//! Combat.
//!
//! [`CombatState`] records who attacks and who blocks whom for the
//! current combat. Declarations are validated in [`declare`]; the damage
//! steps are run by [`damage`].

mod damage;
mod declare;

use serde::{Deserialize, Serialize};

use crate::core::{PermanentId, PlayerId};

pub use damage::{
    assign_combat_damage, continue_combat_damage, resolve_combat_damage, CombatAssignment,
    CombatProgress, PendingCombatDamage,
};
pub use declare::{can_block, declare_attackers, declare_blockers};

/// One blocker blocking one attacker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub blocker: PermanentId,
    pub attacker: PermanentId,
}

/// Attack and block declarations of the current combat.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    pub defending_player: Option<PlayerId>,
    /// Attackers in declaration order.
    pub attackers: Vec<PermanentId>,
    /// Blocks in declaration order.
    pub blocks: Vec<Block>,
    /// Attackers that were blocked. They stay blocked even if every
    /// blocker leaves combat.
    pub blocked: Vec<PermanentId>,
    pub attackers_declared: bool,
    pub blockers_declared: bool,
    /// Creatures that dealt damage in the first-strike step.
    pub first_strike_dealt: Vec<PermanentId>,
}

impl CombatState {
    #[must_use]
    pub fn new(defending_player: PlayerId) -> Self {
        Self {
            defending_player: Some(defending_player),
            ..Self::default()
        }
    }

    /// Attackers, then blockers.
    pub fn participants(&self) -> impl Iterator<Item = PermanentId> + '_ {
        self.attackers
            .iter()
            .copied()
            .chain(self.blocks.iter().map(|b| b.blocker))
    }

    #[must_use]
    pub fn is_attacking(&self, id: PermanentId) -> bool {
        self.attackers.contains(&id)
    }

    #[must_use]
    pub fn is_blocked(&self, attacker: PermanentId) -> bool {
        self.blocked.contains(&attacker)
    }

    /// Blockers of `attacker`, in declaration order.
    #[must_use]
    pub fn blockers_of(&self, attacker: PermanentId) -> Vec<PermanentId> {
        self.blocks
            .iter()
            .filter(|b| b.attacker == attacker)
            .map(|b| b.blocker)
            .collect()
    }

    /// Attackers `blocker` blocks, in declaration order.
    #[must_use]
    pub fn blocked_by(&self, blocker: PermanentId) -> Vec<PermanentId> {
        self.blocks
            .iter()
            .filter(|b| b.blocker == blocker)
            .map(|b| b.attacker)
            .collect()
    }

    /// Remove a permanent from combat (it left, changed control or regenerated).
    pub fn forget(&mut self, id: PermanentId) {
        self.attackers.retain(|a| *a != id);
        self.blocked.retain(|a| *a != id);
        self.blocks.retain(|b| b.blocker != id && b.attacker != id);
    }
}
