use nova_core::GameId;
use std::collections::HashMap;
use std::sync::Condvar;
use std::sync::Mutex;

/// Lock level on one game.
///
/// Critical access serializes mutations (type, state, config, schedule,
/// player list) against the background host runner. Simple access covers
/// plain reads. This is an arbiter, not a reader/writer lock: it does
/// not try to parallelize readers from different requesters, it only
/// keeps commands and host runs from interleaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockLevel {
    Simple,
    Critical,
}

#[derive(Debug, Default)]
struct LockState {
    critical: bool,
    simple: usize,
}

/// Per-game lock table.
#[derive(Debug, Default)]
pub struct GameArbiter {
    locks: Mutex<HashMap<GameId, LockState>>,
    released: Condvar,
}

impl GameArbiter {
    pub fn new() -> Self {
        Self::default()
    }
    /// Block until the requested access is available.
    pub fn lock(&self, game_id: GameId, level: LockLevel) -> Guard<'_> {
        let mut locks = self.locks.lock().unwrap();
        loop {
            let state = locks.entry(game_id).or_default();
            let free = match level {
                LockLevel::Critical => !state.critical && state.simple == 0,
                LockLevel::Simple => !state.critical,
            };
            if free {
                match level {
                    LockLevel::Critical => state.critical = true,
                    LockLevel::Simple => state.simple += 1,
                }
                return Guard {
                    arbiter: self,
                    game_id,
                    level,
                };
            }
            locks = self.released.wait(locks).unwrap();
        }
    }
    fn release(&self, game_id: GameId, level: LockLevel) {
        let mut locks = self.locks.lock().unwrap();
        if let Some(state) = locks.get_mut(&game_id) {
            match level {
                LockLevel::Critical => state.critical = false,
                LockLevel::Simple => state.simple = state.simple.saturating_sub(1),
            }
            if !state.critical && state.simple == 0 {
                locks.remove(&game_id);
            }
        }
        self.released.notify_all();
    }
}

/// Scoped lock; released on drop.
pub struct Guard<'a> {
    arbiter: &'a GameArbiter,
    game_id: GameId,
    level: LockLevel,
}

impl Drop for Guard<'_> {
    fn drop(&mut self) {
        self.arbiter.release(self.game_id, self.level);
    }
}
