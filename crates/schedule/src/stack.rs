use crate::Schedule;
use nova_store::Store;
use nova_store::StoreExt;

/// The per-game schedule stack as persisted in the store.
///
/// Schedules live under `<base>:<id>` hashes; `<base>:list` holds the
/// stack order with the active schedule at the front, and `<base>:lastId`
/// allocates ids.
#[derive(Debug, Clone)]
pub struct ScheduleStack {
    base: String,
}

impl ScheduleStack {
    /// `base` is the schedule namespace of one game, e.g. `game:7:schedule`.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
    fn list_key(&self) -> String {
        format!("{}:list", self.base)
    }
    fn entry_key(&self, id: &str) -> String {
        format!("{}:{}", self.base, id)
    }
    /// Stack order, active schedule first.
    pub fn ids(&self, store: &dyn Store) -> Vec<String> {
        store.lrange_str(&self.list_key())
    }
    pub fn len(&self, store: &dyn Store) -> usize {
        store.llen(&self.list_key())
    }
    pub fn is_empty(&self, store: &dyn Store) -> bool {
        self.len(store) == 0
    }
    pub fn load(&self, store: &dyn Store, id: &str) -> Schedule {
        Schedule::load_from(store, &self.entry_key(id))
    }
    /// All schedules in stack order.
    pub fn all(&self, store: &dyn Store) -> Vec<Schedule> {
        self.ids(store)
            .iter()
            .map(|id| self.load(store, id))
            .collect()
    }
    /// The active schedule, if any.
    pub fn front(&self, store: &dyn Store) -> Option<(String, Schedule)> {
        self.ids(store)
            .into_iter()
            .next()
            .map(|id| (id.clone(), self.load(store, &id)))
    }
    /// Push a new schedule as the active one; returns its id.
    pub fn push_front(&self, store: &dyn Store, schedule: &Schedule) -> String {
        let id = store.incr(&format!("{}:lastId", self.base), 1).to_string();
        schedule.save_to(store, &self.entry_key(&id));
        store.lpush(&self.list_key(), id.as_bytes());
        id
    }
    /// Overwrite the active schedule in place.
    pub fn replace_front(&self, store: &dyn Store, schedule: &Schedule) -> Option<String> {
        let id = self.ids(store).into_iter().next()?;
        schedule.save_to(store, &self.entry_key(&id));
        Some(id)
    }
    /// Remove the active schedule; returns its id.
    pub fn drop_front(&self, store: &dyn Store) -> Option<String> {
        let id = store.lpop(&self.list_key())?;
        let id = String::from_utf8_lossy(&id).into_owned();
        store.del(&self.entry_key(&id));
        Some(id)
    }
}
