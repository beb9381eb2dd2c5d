//! Finding the abilities an event triggers.
//!
//! Triggered abilities are not registered anywhere: they are read off the
//! effect slots of the cards involved each time an event is raised, so
//! there is nothing to keep in sync when permanents come and go.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use super::event::GameEvent;
use crate::cards::{Card, EffectSlot};
use crate::core::{GameData, InvariantViolation, PermanentId, PlayerId};
use crate::effects::{Effect, TargetSpec};
use crate::stack::{StackEntry, StackEntryId, StackEntryKind};

/// A triggered ability waiting to be put on the stack (or, for mana
/// abilities, to resolve on the spot).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingTrigger {
    pub controller: PlayerId,
    /// Snapshot of the source; it may have left the game by the time the
    /// trigger is put on the stack.
    pub source: Card,
    pub source_permanent: Option<PermanentId>,
    pub effects: Vec<Effect>,
    pub event_player: Option<PlayerId>,
}

impl PendingTrigger {
    pub(crate) fn to_stack_entry(&self) -> StackEntry {
        StackEntry {
            id: StackEntryId::new(0),
            kind: StackEntryKind::TriggeredAbility,
            controller: self.controller,
            card: self.source.clone(),
            source_permanent: self.source_permanent,
            effects: self.effects.clone(),
            targets: SmallVec::new(),
            target_spec: TargetSpec::None,
            x_value: 0,
            event_player: self.event_player,
        }
    }
}

fn trigger_for(
    game: &GameData,
    permanent: PermanentId,
    event: &GameEvent,
) -> Result<Option<PendingTrigger>, InvariantViolation> {
    let Some(slot) = event.slot() else {
        return Ok(None);
    };
    let Some(perm) = game.permanent(permanent) else {
        return Ok(None);
    };
    let card = game.card(perm.card)?;
    let effects = card.def.effects_in(slot);
    if effects.is_empty() {
        return Ok(None);
    }
    Ok(Some(PendingTrigger {
        controller: perm.controller,
        source: card.clone(),
        source_permanent: Some(permanent),
        effects: effects.to_vec(),
        event_player: event.player(),
    }))
}

/// Every ability `event` triggers, in APNAP order of controllers.
pub fn collect_triggers(
    game: &GameData,
    event: &GameEvent,
) -> Result<Vec<PendingTrigger>, InvariantViolation> {
    let mut found = Vec::new();
    match event {
        GameEvent::EntersBattlefield { permanent } => {
            found.extend(trigger_for(game, *permanent, event)?);
        }
        GameEvent::Dies {
            card,
            controller,
            permanent,
        } => {
            let card = game.card(*card)?;
            let effects = card.def.effects_in(EffectSlot::Dies);
            if !effects.is_empty() {
                found.push(PendingTrigger {
                    controller: *controller,
                    source: card.clone(),
                    source_permanent: Some(*permanent),
                    effects: effects.to_vec(),
                    event_player: None,
                });
            }
        }
        GameEvent::StepBegan { active, .. } => {
            for id in game.player(*active).battlefield.iter() {
                found.extend(trigger_for(game, *id, event)?);
            }
        }
        GameEvent::LandTapped { .. } => {
            for id in game.permanents_apnap() {
                found.extend(trigger_for(game, id, event)?);
            }
        }
    }
    Ok(found)
}

/// Queue every ability `event` triggers to be put on the stack.
///
/// Events that resolve immediately are ignored here; the caller resolves
/// those through [`collect_triggers`].
pub fn raise(game: &mut GameData, event: &GameEvent) -> Result<(), InvariantViolation> {
    if event.resolves_immediately() {
        return Ok(());
    }
    for trigger in collect_triggers(game, event)? {
        debug!(source = %trigger.source.name(), controller = %trigger.controller, "ability triggered");
        game.stack.queue_trigger(trigger);
    }
    Ok(())
}

/// Put every queued trigger on the stack and log each one.
pub fn flush_triggers(game: &mut GameData) -> usize {
    let active = game.active_player();
    let pushed = game.stack.flush_triggers(active);
    for id in &pushed {
        if let Some(entry) = game.stack.get(*id) {
            let line = format!("{} triggers.", entry.description());
            game.log.push(line);
        }
    }
    pushed.len()
}
