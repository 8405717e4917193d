use crate::Action;
use crate::Event;
use crate::GameArbiter;
use crate::LockLevel;
use crate::compute_game_times;
use crate::process_inactivity_kicks;
use crate::prune_expired_schedules;
use nova_core::GameId;
use nova_core::Time;
use nova_game::Game;
use nova_game::GameState;
use nova_game::HostError;
use nova_game::Root;
use nova_store::Store;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

/// Executes the actual host and master runs. The real runner shells out
/// to the host tools; this workspace only decides the timing.
pub trait Runner: Send + Sync {
    fn run_host(&self, root: &Root, game_id: GameId) -> nova_game::Result<()>;
    fn run_master(&self, root: &Root, game_id: GameId) -> nova_game::Result<()>;
}

/// Stand-in runner: logs the run and advances the turn bookkeeping so
/// the schedule keeps moving. Used by the daemon until a real host tool
/// chain is attached.
#[derive(Debug, Default)]
pub struct LogRunner;

impl Runner for LogRunner {
    fn run_host(&self, root: &Root, game_id: GameId) -> nova_game::Result<()> {
        let game = Game::open(root, game_id)?;
        let turn = game.turn_number() + 1;
        game.set_config_int("turn", turn as i64);
        game.set_config_int("lastHostTime", root.time() as i64);
        game.remove_config("hostRunNow");
        // The new turn starts with no submissions anywhere.
        for slot in 1..=nova_core::NUM_PLAYERS as nova_core::Slot {
            game.set_slot_turn_status(slot, 0);
        }
        log::info!("[cron] game {}: host run, now turn {}", game_id, turn);
        Ok(())
    }
    fn run_master(&self, root: &Root, game_id: GameId) -> nova_game::Result<()> {
        let game = Game::open(root, game_id)?;
        game.set_config_int("masterHasRun", 1);
        game.set_config_int("turn", 1);
        game.set_config_int("lastHostTime", root.time() as i64);
        if game.state()? == GameState::Joining {
            game.set_state(GameState::Running)?;
        }
        log::info!("[cron] game {}: master run", game_id);
        Ok(())
    }
}

/// The scheduler worker: one logical thread owning all game timing.
pub struct Cron {
    root: Arc<Root>,
    arbiter: Arc<GameArbiter>,
    runner: Arc<dyn Runner>,
    /// Next event per game, earliest first when iterated by value.
    events: Mutex<BTreeMap<GameId, Event>>,
}

impl Cron {
    pub fn new(root: Arc<Root>, arbiter: Arc<GameArbiter>, runner: Arc<dyn Runner>) -> Self {
        Self {
            root,
            arbiter,
            runner,
            events: Mutex::new(BTreeMap::new()),
        }
    }

    /// Games the scheduler watches.
    fn watched_games(&self) -> Vec<GameId> {
        let store = self.root.store();
        let mut ids: Vec<GameId> = ["joining", "running"]
            .iter()
            .flat_map(|state| store.smembers(&format!("game:state:{}", state)))
            .filter_map(|id| id.parse().ok())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Recompute the event of one game.
    pub fn schedule_game(&self, now: Time, game_id: GameId) {
        match compute_game_times(now, self.root.as_ref(), game_id) {
            Ok(Some(event)) => {
                log::debug!("[cron] scheduled: {}", event);
                self.events.lock().unwrap().insert(game_id, event);
            }
            Ok(None) => {
                self.events.lock().unwrap().remove(&game_id);
            }
            Err(error) if error.is_transient() => {
                log::warn!("[cron] game {}: {}", game_id, error);
            }
            Err(error) => {
                // Corrupted persisted state; demand operator attention.
                log::error!("[cron] game {}: {}", game_id, error);
                self.events.lock().unwrap().remove(&game_id);
                Game::open_unchecked(self.root.as_ref(), game_id)
                    .mark_broken(&error.to_string());
            }
        }
    }

    /// Recompute every watched game.
    pub fn schedule_all(&self, now: Time) {
        for game_id in self.watched_games() {
            self.schedule_game(now, game_id);
        }
    }

    /// Execute everything due at `now`. One game at a time, under the
    /// critical lock; a host run in progress always completes.
    pub fn run_due_events(&self, now: Time) {
        loop {
            let due = {
                let events = self.events.lock().unwrap();
                events.values().filter(|e| e.time <= now).min_by_key(|e| e.time).copied()
            };
            let Some(event) = due else {
                return;
            };
            self.events.lock().unwrap().remove(&event.game_id);
            let _guard = self.arbiter.lock(event.game_id, LockLevel::Critical);
            log::info!("[cron] running: {}", event);
            let result = match event.action {
                Action::Host => self.runner.run_host(self.root.as_ref(), event.game_id),
                Action::Master => self.runner.run_master(self.root.as_ref(), event.game_id),
                Action::ScheduleChange => Ok(()),
            };
            match result {
                Ok(()) => {
                    let game = Game::open_unchecked(self.root.as_ref(), event.game_id);
                    prune_expired_schedules(now, self.root.as_ref(), &game);
                    self.schedule_game(now, event.game_id);
                }
                Err(error) if error.is_transient() => {
                    log::warn!("[cron] {}: {}", event, error);
                }
                Err(error) => {
                    log::error!("[cron] {}: {}", event, error);
                    Game::open_unchecked(self.root.as_ref(), event.game_id)
                        .mark_broken(&error.to_string());
                }
            }
        }
    }

    /// One scheduler pass: recompute, run due events, kick the idle.
    pub fn step(&self, now: Time) {
        self.schedule_all(now);
        self.run_due_events(now);
    }

    /// Periodic inactivity pass over all running games.
    pub fn kick_pass(&self) {
        for game_id in self.watched_games() {
            let _guard = self.arbiter.lock(game_id, LockLevel::Critical);
            match process_inactivity_kicks(self.root.as_ref(), game_id) {
                Ok(()) => {}
                Err(HostError::GameNotFound) => {}
                Err(error) if error.is_transient() => {
                    log::warn!("[cron] kicks for game {}: {}", game_id, error);
                }
                Err(error) => log::error!("[cron] kicks for game {}: {}", game_id, error),
            }
        }
    }

    /// Time of the next pending event, if any.
    pub fn next_event_time(&self) -> Option<Time> {
        self.events.lock().unwrap().values().map(|e| e.time).min()
    }

    /// Worker loop. Wakes on game-change notifications, at the next
    /// event, and at the poll interval; runs until the channel closes.
    pub fn run(&self, changes: Receiver<GameId>) {
        log::info!("[cron] worker starting");
        loop {
            let now = self.root.time();
            self.step(now);
            let poll = self.root.config().poll_interval.max(1) as u64 * 60;
            let sleep = self
                .next_event_time()
                .map(|t| (t - now).max(0) as u64 * 60)
                .unwrap_or(poll)
                .min(poll)
                .max(1);
            match changes.recv_timeout(Duration::from_secs(sleep)) {
                Ok(game_id) => {
                    // Mutation arrived; recompute that game right away.
                    self.schedule_game(self.root.time(), game_id);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log::info!("[cron] worker stopping");
                    return;
                }
            }
        }
    }
}
