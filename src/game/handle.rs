//! Shared access to one game.
//!
//! Each game sits behind its own lock, so two players' submissions can
//! never interleave mid-mutation. Different games share nothing.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{Game, GameSnapshot, Progress};
use crate::core::{Action, GameResult, InvariantViolation, PlayerId};

/// A cloneable, thread-safe handle to a [`Game`].
#[derive(Clone)]
pub struct GameHandle {
    inner: Arc<Mutex<Game>>,
}

impl GameHandle {
    #[must_use]
    pub fn new(game: Game) -> Self {
        Self {
            inner: Arc::new(Mutex::new(game)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Game>, InvariantViolation> {
        self.inner.lock().map_err(|_| InvariantViolation::PoisonedLock)
    }

    /// Apply one action while holding the game's lock.
    pub fn apply(&self, player: PlayerId, action: Action) -> GameResult<Progress> {
        self.lock()?.apply(player, action)
    }

    pub fn snapshot(&self) -> GameResult<GameSnapshot> {
        Ok(self.lock()?.snapshot())
    }

    /// Run `f` against the game while holding its lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut Game) -> R) -> GameResult<R> {
        let mut game = self.lock()?;
        Ok(f(&mut game))
    }
}

impl std::fmt::Debug for GameHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::core::RulesConfig;

    #[test]
    fn test_handle_is_shared() {
        let mut game = Game::new(RulesConfig::default().with_opening_hand_size(0)).unwrap();
        game.start().unwrap();
        let handle = GameHandle::new(game);

        let other = handle.clone();
        let progress = thread::spawn(move || other.apply(PlayerId::new(0), Action::PassPriority))
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(progress, Progress::Priority(PlayerId::new(1)));
        assert_eq!(handle.with(|g| g.data().history.len()).unwrap(), 1);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let handle = GameHandle::new(Game::new(RulesConfig::default()).unwrap());
        let other = handle.clone();
        let _ = thread::spawn(move || {
            other
                .with(|_| panic!("caller panicked while holding the game"))
                .ok();
        })
        .join();

        let err = handle.snapshot().unwrap_err();
        assert!(err.is_fatal());
    }
}
