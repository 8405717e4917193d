use crate::Root;
use nova_store::Store;
use nova_store::StoreExt;

/// Handle to one user profile in the store.
pub struct User<'a> {
    root: &'a Root,
    id: String,
}

impl<'a> User<'a> {
    pub fn new(root: &'a Root, id: impl Into<String>) -> Self {
        Self { root, id: id.into() }
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn exists(root: &Root, id: &str) -> bool {
        root.store().exists(&format!("user:{}:name", id))
            || root.store().exists(&format!("user:{}:profile", id))
    }
    fn profile_key(&self) -> String {
        format!("user:{}:profile", self.id)
    }
    pub fn profile_int(&self, field: &str) -> i64 {
        self.root.store().hget_int(&self.profile_key(), field)
    }
    pub fn set_profile_int(&self, field: &str, value: i64) {
        self.root.store().hset_int(&self.profile_key(), field, value);
    }
    pub fn incr_profile_int(&self, field: &str, by: i64) -> i64 {
        self.root.store().hincr(&self.profile_key(), field, by)
    }
    pub fn screen_name(&self) -> String {
        self.root.store().hget_str(&self.profile_key(), "screenname")
    }

    pub fn turns_played(&self) -> i64 {
        self.profile_int("turnsplayed")
    }
    pub fn turns_missed(&self) -> i64 {
        self.profile_int("turnsmissed")
    }
    /// Turn reliability, scaled by RELIABILITY_SCALE.
    pub fn turn_reliability(&self) -> i64 {
        self.profile_int("turnreliability")
    }
    pub fn set_turn_reliability(&self, value: i64) {
        self.set_profile_int("turnreliability", value);
    }
    /// Current rank, 0 = recruit.
    pub fn rank(&self) -> i64 {
        self.profile_int("rank")
    }
    pub fn set_rank(&self, rank: i64) {
        self.set_profile_int("rank", rank);
    }
    pub fn rank_points(&self) -> i64 {
        self.profile_int("rankpoints")
    }
    /// Games the user is or was subscribed to.
    pub fn games(&self) -> Vec<String> {
        self.root.store().smembers(&format!("user:{}:games", self.id))
    }
    pub fn history(&self, limit: usize) -> Vec<String> {
        self.root
            .store()
            .lrange_str(&format!("user:{}:history", self.id))
            .into_iter()
            .take(limit)
            .collect()
    }
}
