//! Priority and the LIFO stack.
//!
//! Entries resolve last-in, first-out. Players pass priority in seat
//! order; when every player still in the game has passed in succession,
//! the top entry resolves (or, with an empty stack, the step ends). Any
//! other action resets the pass counter.

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{StackEntry, StackEntryId};
use crate::core::PlayerId;
use crate::triggers::PendingTrigger;

/// The stack plus priority bookkeeping.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriorityStack {
    /// Index 0 is the bottom, the last entry is the top.
    entries: Vector<StackEntry>,

    /// Triggered abilities waiting to be put on the stack.
    pending_triggers: Vector<PendingTrigger>,

    current_priority: PlayerId,

    /// Players who have passed since the last action or resolution.
    consecutive_passes: usize,

    player_count: usize,

    next_id: u32,
}

impl PriorityStack {
    /// An empty stack with `first` holding priority.
    #[must_use]
    pub fn new(player_count: usize, first: PlayerId) -> Self {
        Self {
            entries: Vector::new(),
            pending_triggers: Vector::new(),
            current_priority: first,
            consecutive_passes: 0,
            player_count,
            next_id: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn top(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn get(&self, id: StackEntryId) -> Option<&StackEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &StackEntry> {
        self.entries.iter()
    }

    /// Push an entry, assigning its id. Resets passes and gives priority
    /// to the entry's controller.
    pub fn push(&mut self, mut entry: StackEntry) -> StackEntryId {
        let id = StackEntryId::new(self.next_id);
        self.next_id += 1;
        entry.id = id;

        debug!(entry = %id, controller = %entry.controller, kind = ?entry.kind, "stack push");
        self.current_priority = entry.controller;
        self.consecutive_passes = 0;
        self.entries.push_back(entry);
        id
    }

    /// Push an entry without touching priority.
    fn push_quiet(&mut self, mut entry: StackEntry) -> StackEntryId {
        let id = StackEntryId::new(self.next_id);
        self.next_id += 1;
        entry.id = id;
        self.entries.push_back(entry);
        id
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop_back()
    }

    /// Take an entry out of the middle of the stack (countering).
    pub fn remove(&mut self, id: StackEntryId) -> Option<StackEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    // === Priority ===

    #[must_use]
    pub fn priority_holder(&self) -> PlayerId {
        self.current_priority
    }

    /// Give priority to `player` and reset the pass counter.
    pub fn give_priority(&mut self, player: PlayerId) {
        self.current_priority = player;
        self.consecutive_passes = 0;
    }

    /// Reset passes after a state change; the holder keeps priority.
    pub fn reset_passes(&mut self) {
        self.consecutive_passes = 0;
    }

    /// Record a pass by the current holder.
    ///
    /// Returns `true` once every live player has passed in succession.
    /// Otherwise priority moves to the next live seat.
    pub fn pass(&mut self, is_live: impl Fn(PlayerId) -> bool) -> bool {
        self.consecutive_passes += 1;
        let live = PlayerId::all(self.player_count).filter(|p| is_live(*p)).count();
        if self.consecutive_passes >= live {
            return true;
        }

        let mut next = self.current_priority.next(self.player_count);
        while !is_live(next) && next != self.current_priority {
            next = next.next(self.player_count);
        }
        self.current_priority = next;
        false
    }

    #[must_use]
    pub fn passes(&self) -> usize {
        self.consecutive_passes
    }

    // === Triggers ===

    pub fn queue_trigger(&mut self, trigger: PendingTrigger) {
        self.pending_triggers.push_back(trigger);
    }

    #[must_use]
    pub fn has_pending_triggers(&self) -> bool {
        !self.pending_triggers.is_empty()
    }

    /// Put every waiting trigger on the stack.
    ///
    /// Triggers controlled by the active player go on first, then the
    /// other seats in turn order, so the last seat's triggers resolve
    /// first. Within one controller the queue order is kept. Returns the
    /// entries pushed, bottom to top.
    pub fn flush_triggers(&mut self, active: PlayerId) -> Vec<StackEntryId> {
        let pending = std::mem::take(&mut self.pending_triggers);
        let mut pushed = Vec::with_capacity(pending.len());

        for seat in PlayerId::apnap(active, self.player_count) {
            for trigger in pending.iter().filter(|t| t.controller == seat) {
                let id = self.push_quiet(trigger.to_stack_entry());
                debug!(entry = %id, controller = %seat, "trigger put on stack");
                pushed.push(id);
            }
        }
        if !pushed.is_empty() {
            self.consecutive_passes = 0;
        }
        pushed
    }
}
