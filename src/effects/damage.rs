//! Dealing damage.
//!
//! Spells, abilities and combat all route damage through [`deal_damage`]
//! so that prevention, protection, lifelink and the log line behave the
//! same way everywhere. Damage to a permanent is only *marked*;
//! state-based actions decide whether it dies.
//!
//! Prevention is applied in this order: blanket prevention (all combat
//! damage, or damage from a prevented colour) and protection stop the
//! damage outright; otherwise the game-wide shield absorbs what it can,
//! then the recipient's own shield.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{Color, Keywords};
use crate::continuous;
use crate::core::{GameData, PermanentId, PlayerId};

/// Something that can be dealt damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageRecipient {
    Player(PlayerId),
    Permanent(PermanentId),
}

/// The object dealing damage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageSource {
    pub name: String,
    pub color: Option<Color>,
    pub controller: PlayerId,
    pub lifelink: bool,
    pub combat: bool,
}

impl DamageSource {
    /// A permanent as a damage source, with its current colour and
    /// controller.
    #[must_use]
    pub fn permanent(game: &GameData, id: PermanentId) -> Option<Self> {
        let c = continuous::characteristics(game, id)?;
        Some(Self {
            name: game.permanent_name(id),
            color: c.color,
            controller: c.controller,
            lifelink: c.keywords.contains(Keywords::LIFELINK),
            combat: false,
        })
    }
}

/// Game-wide prevention effects. All of it ends at cleanup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamagePrevention {
    /// The next this-much damage to anything is prevented.
    pub shield: i32,
    pub all_combat: bool,
    pub from_colors: SmallVec<[Color; 2]>,
}

impl DamagePrevention {
    fn stops(&self, source: &DamageSource) -> bool {
        (source.combat && self.all_combat)
            || source.color.is_some_and(|c| self.from_colors.contains(&c))
    }
}

/// Spend shields against `amount`, game-wide first. Returns what gets through.
fn absorb(game: &mut GameData, to: DamageRecipient, amount: i32) -> i32 {
    let global = game.prevention.shield.clamp(0, amount);
    game.prevention.shield -= global;
    let amount = amount - global;

    let shield = match to {
        DamageRecipient::Player(player) => &mut game.player_mut(player).prevention_shield,
        DamageRecipient::Permanent(id) => match game.permanent_mut(id) {
            Some(perm) => &mut perm.prevention_shield,
            None => return amount,
        },
    };
    let own = (*shield).clamp(0, amount);
    *shield -= own;
    amount - own
}

/// Deal `amount` damage. Returns the damage actually dealt.
///
/// Damage to a player who has lost or to a permanent that left the
/// battlefield is dropped silently; prevented damage is logged.
pub fn deal_damage(game: &mut GameData, source: &DamageSource, to: DamageRecipient, amount: i32) -> i32 {
    if amount <= 0 {
        return 0;
    }
    let name = match to {
        DamageRecipient::Player(player) => {
            if !game.players.contains(player) || game.player(player).has_lost {
                return 0;
            }
            player.to_string()
        }
        DamageRecipient::Permanent(id) => {
            if !game.is_on_battlefield(id) {
                return 0;
            }
            game.permanent_name(id)
        }
    };

    let protected = match to {
        DamageRecipient::Permanent(id) => continuous::has_protection_from(game, id, source.color),
        DamageRecipient::Player(_) => false,
    };
    let amount = if protected || game.prevention.stops(source) {
        0
    } else {
        absorb(game, to, amount)
    };
    if amount == 0 {
        game.log.push(format!("Damage from {} to {} is prevented.", source.name, name));
        return 0;
    }

    match to {
        DamageRecipient::Player(player) => game.player_mut(player).life -= amount,
        DamageRecipient::Permanent(id) => {
            if let Some(perm) = game.permanent_mut(id) {
                perm.damage += amount;
            }
        }
    }
    game.log.push(format!("{} deals {} damage to {}.", source.name, amount, name));
    if source.lifelink {
        game.player_mut(source.controller).life += amount;
        let line = format!("{} gains {} life.", source.controller, amount);
        game.log.push(line);
    }
    amount
}
