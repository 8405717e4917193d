use crate::MailQueue;
use crate::NullMailQueue;
use nova_core::GameId;
use nova_core::Time;
use nova_store::MemoryStore;
use nova_store::Store;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;
use std::sync::mpsc::Sender;

/// Time source. Production uses the wall clock; tests pin it.
pub trait Clock: Send + Sync {
    fn now(&self) -> Time;
}

/// Wall-clock time in minutes since the epoch.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Time {
        nova_core::now()
    }
}

/// Pinned clock for tests.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicI32);

impl ManualClock {
    pub fn new(time: Time) -> Self {
        Self(AtomicI32::new(time))
    }
    pub fn set(&self, time: Time) {
        self.0.store(time, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Time {
        self.0.load(Ordering::Relaxed)
    }
}

/// Server-wide configuration of the host service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Seconds per internal minute for user-facing times.
    pub user_time_scale: i64,
    /// Default for games without their own kick limit.
    pub num_missed_turns_for_kick: i32,
    /// Cron poll interval in minutes.
    pub poll_interval: Time,
    /// Default names of the host, master, and ship list tools.
    pub default_host: String,
    pub default_master: String,
    pub default_ship_list: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_time_scale: 60,
            num_missed_turns_for_kick: nova_core::DEFAULT_MISSED_TURNS_FOR_KICK,
            poll_interval: nova_core::CRON_POLL_INTERVAL,
            default_host: "host".to_string(),
            default_master: "master".to_string(),
            default_ship_list: "shiplist".to_string(),
        }
    }
}

/// Service root: everything a request handler or the cron needs.
pub struct Root {
    store: Arc<dyn Store>,
    config: Config,
    mail: Arc<dyn MailQueue>,
    clock: Arc<dyn Clock>,
    /// Scheduler wake-up line; the cron subscribes at startup.
    change_tx: Mutex<Option<Sender<GameId>>>,
}

impl Root {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config,
            mail: Arc::new(NullMailQueue),
            clock: Arc::new(SystemClock),
            change_tx: Mutex::new(None),
        }
    }
    /// In-memory root with a pinned clock, for tests.
    pub fn for_testing(time: Time) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            config: Config::default(),
            mail: Arc::new(crate::MemoryMailQueue::new()),
            clock: Arc::new(ManualClock::new(time)),
            change_tx: Mutex::new(None),
        }
    }
    pub fn with_mail(mut self, mail: Arc<dyn MailQueue>) -> Self {
        self.mail = mail;
        self
    }
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
    pub fn store_arc(&self) -> Arc<dyn Store> {
        self.store.clone()
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn mail(&self) -> &dyn MailQueue {
        self.mail.as_ref()
    }
    pub fn time(&self) -> Time {
        self.clock.now()
    }
    /// Register the scheduler's wake-up line.
    pub fn subscribe_game_changes(&self, tx: Sender<GameId>) {
        *self.change_tx.lock().unwrap() = Some(tx);
    }
    /// Tell the scheduler that a game's scheduler-relevant state changed.
    /// Without a subscriber this is a no-op; the next poll picks it up.
    pub fn handle_game_change(&self, game_id: GameId) {
        if let Some(tx) = self.change_tx.lock().unwrap().as_ref() {
            let _ = tx.send(game_id);
        }
    }
}
