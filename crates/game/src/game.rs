use crate::GameState;
use crate::GameType;
use crate::HostError;
use crate::Result;
use crate::Root;
use crate::TurnState;
use nova_core::GameId;
use nova_core::NUM_PLAYERS;
use nova_core::PlayerSet;
use nova_core::Score;
use nova_core::Slot;
use nova_core::Time;
use nova_core::Turn;
use nova_store::Store;
use nova_store::StoreExt;

/// Permission levels a request can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionLevel {
    /// Read (see) the game.
    Read,
    /// Configure the game.
    Config,
    /// Super-powers; currently equivalent to Config.
    Admin,
}

/// Handle to one game in the store.
///
/// Provides the database schema: all keys of a game are derived here and
/// nowhere else.
pub struct Game<'a> {
    root: &'a Root,
    id: GameId,
}

impl<'a> Game<'a> {
    /// Open a game, verifying it exists.
    pub fn open(root: &'a Root, id: GameId) -> Result<Self> {
        if !root.store().sismember("game:all", &id.to_string()) {
            return Err(HostError::GameNotFound);
        }
        Ok(Self { root, id })
    }
    /// Open without the existence check, saving a store round-trip where
    /// the caller already knows the game exists.
    pub fn open_unchecked(root: &'a Root, id: GameId) -> Self {
        Self { root, id }
    }
    pub fn id(&self) -> GameId {
        self.id
    }
    fn key(&self, suffix: &str) -> String {
        format!("game:{}:{}", self.id, suffix)
    }
    fn settings_key(&self) -> String {
        self.key("settings")
    }

    // ------------------------------------------------------------------
    // State, type, name, owner
    // ------------------------------------------------------------------

    pub fn state(&self) -> Result<GameState> {
        let raw = self.root.store().get_str(&self.key("state"));
        GameState::parse(&raw)
            .ok_or_else(|| HostError::PreconditionViolated(format!("bad game state '{}'", raw)))
    }
    /// Change the state, maintaining the state index sets and history.
    pub fn set_state(&self, new_state: GameState) -> Result<()> {
        let store = self.root.store();
        let id = self.id.to_string();
        let is_public = self.game_type()? == GameType::Public;
        if let Ok(old) = self.state() {
            store.srem(&format!("game:state:{}", old.format()), &id);
            store.srem(&format!("game:pubstate:{}", old.format()), &id);
        }
        store.set(&self.key("state"), new_state.format().as_bytes());
        store.sadd(&format!("game:state:{}", new_state.format()), &id);
        if is_public {
            store.sadd(&format!("game:pubstate:{}", new_state.format()), &id);
        }
        self.add_game_history_item("game-state", new_state.format(), is_public);
        self.root.handle_game_change(self.id);
        Ok(())
    }
    pub fn game_type(&self) -> Result<GameType> {
        let raw = self.root.store().get_str(&self.key("type"));
        GameType::parse(&raw)
            .ok_or_else(|| HostError::PreconditionViolated(format!("bad game type '{}'", raw)))
    }
    pub fn set_type(&self, new_type: GameType) -> Result<()> {
        let store = self.root.store();
        let id = self.id.to_string();
        // Moving into or out of "public" changes the pubstate index.
        if let (Ok(state), Ok(old)) = (self.state(), self.game_type()) {
            if old == GameType::Public && new_type != GameType::Public {
                store.srem(&format!("game:pubstate:{}", state.format()), &id);
            }
            if old != GameType::Public && new_type == GameType::Public {
                store.sadd(&format!("game:pubstate:{}", state.format()), &id);
            }
        }
        store.set(&self.key("type"), new_type.format().as_bytes());
        Ok(())
    }
    pub fn name(&self) -> String {
        self.root.store().get_str(&self.key("name"))
    }
    pub fn set_name(&self, name: &str) {
        self.root.store().set(&self.key("name"), name.as_bytes());
    }
    pub fn owner(&self) -> String {
        self.root.store().get_str(&self.key("owner"))
    }
    pub fn set_owner(&self, owner: &str) {
        self.root.store().set(&self.key("owner"), owner.as_bytes());
    }
    pub fn directory(&self) -> String {
        self.root.store().get_str(&self.key("dir"))
    }

    // ------------------------------------------------------------------
    // Configuration (settings hash)
    // ------------------------------------------------------------------

    pub fn get_config(&self, name: &str) -> String {
        self.root.store().hget_str(&self.settings_key(), name)
    }
    pub fn set_config(&self, name: &str, value: &str) {
        self.root.store().hset_str(&self.settings_key(), name, value);
    }
    pub fn get_config_int(&self, name: &str) -> i64 {
        self.root.store().hget_int(&self.settings_key(), name)
    }
    pub fn get_config_int_opt(&self, name: &str) -> Option<i64> {
        self.root.store().hget_int_opt(&self.settings_key(), name)
    }
    pub fn set_config_int(&self, name: &str, value: i64) {
        self.root.store().hset_int(&self.settings_key(), name, value);
    }
    pub fn remove_config(&self, name: &str) {
        self.root.store().hdel(&self.settings_key(), name);
    }

    pub fn turn_number(&self) -> Turn {
        self.get_config_int("turn") as Turn
    }
    pub fn last_host_time(&self) -> Time {
        self.get_config_int("lastHostTime") as Time
    }
    pub fn last_turn_submitted(&self) -> Time {
        self.get_config_int("lastTurnSubmitted") as Time
    }
    pub fn last_schedule_change(&self) -> Time {
        self.get_config_int("lastScheduleChange") as Time
    }
    pub fn set_last_schedule_change(&self, time: Time) {
        self.set_config_int("lastScheduleChange", time as i64);
    }
    pub fn last_player_joined(&self) -> Option<Time> {
        self.get_config_int_opt("lastPlayerJoined").map(|t| t as Time)
    }
    pub fn host_run_now(&self) -> bool {
        self.get_config_int("hostRunNow") != 0
    }
    pub fn set_schedule_changed(&self, value: bool) {
        self.set_config_int("scheduleChanged", value as i64);
    }
    pub fn set_config_changed(&self, value: bool) {
        self.set_config_int("configChanged", value as i64);
    }
    pub fn set_end_changed(&self, value: bool) {
        self.set_config_int("endChanged", value as i64);
    }
    pub fn num_missed_turns_for_kick(&self) -> Option<i32> {
        self.get_config_int_opt("numMissedTurnsForKick").map(|n| n as i32)
    }
    pub fn is_ranking_disabled(&self) -> bool {
        self.get_config_int("rankDisable") != 0
    }
    pub fn is_multi_join_allowed(&self) -> bool {
        self.get_config_int("joinMulti") != 0
    }
    /// Name of the score that decides the game end. Unless configured,
    /// the classic score is the referee.
    pub fn referee_score_name(&self) -> String {
        let name = self.get_config("endScoreName");
        if name.is_empty() {
            "timscore".to_string()
        } else {
            name
        }
    }
    pub fn schedule_base(&self) -> String {
        self.key("schedule")
    }
    pub fn rank_points_key(&self) -> String {
        self.key("rankPoints")
    }

    // ------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------

    fn slot_status_key(&self, slot: Slot) -> String {
        self.key(&format!("player:{}:status", slot))
    }
    fn slot_users_key(&self, slot: Slot) -> String {
        self.key(&format!("player:{}:users", slot))
    }
    pub fn slot_status(&self, slot: Slot) -> i32 {
        self.root.store().hget_int(&self.slot_status_key(slot), "slot") as i32
    }
    pub fn set_slot_status(&self, slot: Slot, value: i32) {
        self.root
            .store()
            .hset_int(&self.slot_status_key(slot), "slot", value as i64);
    }
    pub fn slot_turn_status(&self, slot: Slot) -> i32 {
        self.root.store().hget_int(&self.slot_status_key(slot), "turn") as i32
    }
    pub fn set_slot_turn_status(&self, slot: Slot, value: i32) {
        self.root
            .store()
            .hset_int(&self.slot_status_key(slot), "turn", value as i64);
    }
    pub fn slot_rank(&self, slot: Slot) -> i32 {
        self.root.store().hget_int(&self.slot_status_key(slot), "rank") as i32
    }
    pub fn set_slot_rank(&self, slot: Slot, rank: i32) {
        self.root
            .store()
            .hset_int(&self.slot_status_key(slot), "rank", rank as i64);
    }
    /// True if the slot exists in this game (a player could play it).
    pub fn is_slot_in_game(&self, slot: Slot) -> bool {
        (1..=NUM_PLAYERS as Slot).contains(&slot) && self.slot_status(slot) != 0
    }
    /// True if anyone is subscribed to the slot.
    pub fn is_slot_played(&self, slot: Slot) -> bool {
        self.root.store().llen(&self.slot_users_key(slot)) > 0
    }
    pub fn has_any_open_slot(&self) -> bool {
        (1..=NUM_PLAYERS as Slot).any(|s| self.is_slot_in_game(s) && !self.is_slot_played(s))
    }
    /// Users subscribed to a slot, primary player first.
    pub fn list_players(&self, slot: Slot) -> Vec<String> {
        self.root.store().lrange_str(&self.slot_users_key(slot))
    }
    pub fn primary_player(&self, slot: Slot) -> Option<String> {
        self.list_players(slot).into_iter().next()
    }
    /// Subscribe a user to a slot: primary if the slot was unplayed,
    /// replacement otherwise.
    pub fn push_player_slot(&self, slot: Slot, user: &str) {
        let store = self.root.store();
        store.rpush(&self.slot_users_key(slot), user.as_bytes());
        store.hincr(&self.key("users"), user, 1);
        store.sadd(&format!("user:{}:games", user), &self.id.to_string());
    }
    /// Remove the most recent subscriber of a slot, returning the user.
    pub fn pop_player_slot(&self, slot: Slot) -> Option<String> {
        let store = self.root.store();
        let user = store.rpop(&self.slot_users_key(slot))?;
        let user = String::from_utf8_lossy(&user).into_owned();
        store.hincr(&self.key("users"), &user, -1);
        Some(user)
    }
    /// Slots the user is subscribed to (primary or replacement).
    pub fn slots_by_player(&self, user: &str) -> PlayerSet {
        (1..=NUM_PLAYERS as Slot)
            .filter(|s| self.list_players(*s).iter().any(|u| u == user))
            .collect()
    }
    /// All slots that exist in this game.
    pub fn game_slots(&self) -> PlayerSet {
        (1..=NUM_PLAYERS as Slot)
            .filter(|s| self.is_slot_in_game(*s))
            .collect()
    }
    /// True if the user is or was on this game (holds a reference).
    pub fn is_user_on_game(&self, user: &str) -> bool {
        self.root.store().hget_int(&self.key("users"), user) > 0
    }
    pub fn is_user_on_game_as_primary(&self, user: &str) -> bool {
        (1..=NUM_PLAYERS as Slot).any(|s| self.primary_player(s).as_deref() == Some(user))
    }

    // ------------------------------------------------------------------
    // Turns
    // ------------------------------------------------------------------

    pub fn turn(&self, number: Turn) -> TurnHandle<'_> {
        TurnHandle {
            root: self.root,
            base: self.key(&format!("turn:{}", number)),
        }
    }

    // ------------------------------------------------------------------
    // History and permissions
    // ------------------------------------------------------------------

    /// Record `time:what:gameId:args` in the game history, optionally in
    /// the global history too.
    pub fn add_game_history_item(&self, what: &str, args: &str, global: bool) {
        let item = format!("{}:{}:{}:{}", self.root.time(), what, self.id, args);
        self.root.store().lpush(&self.key("history"), item.as_bytes());
        if global {
            self.root.store().lpush("global:history", item.as_bytes());
        }
    }
    /// Record `time:what:gameId:args` in the game's and one user's history.
    pub fn add_user_history_item(&self, what: &str, args: &str, user: &str) {
        let item = format!("{}:{}:{}:{}", self.root.time(), what, self.id, args);
        self.root.store().lpush(&self.key("history"), item.as_bytes());
        self.root
            .store()
            .lpush(&format!("user:{}:history", user), item.as_bytes());
    }
    pub fn history(&self, limit: usize) -> Vec<String> {
        self.root
            .store()
            .lrange_str(&self.key("history"))
            .into_iter()
            .take(limit)
            .collect()
    }
    /// Permission check for a user id; the empty user is the admin
    /// context and may do anything.
    pub fn has_permission(&self, user: &str, level: PermissionLevel) -> bool {
        if user.is_empty() || self.owner() == user {
            return true;
        }
        match level {
            PermissionLevel::Read => match self.game_type() {
                Ok(GameType::Public) | Ok(GameType::Unlisted) => true,
                _ => self.is_user_on_game(user),
            },
            PermissionLevel::Config | PermissionLevel::Admin => false,
        }
    }

    /// Mark the game broken; the scheduler will skip it from now on.
    pub fn mark_broken(&self, message: &str) {
        log::error!("[game {}] marked broken: {}", self.id, message);
        self.set_config("brokenReason", message);
        let _ = self.set_state(GameState::Deleted);
    }
}

/// Handle to one turn's persisted data.
pub struct TurnHandle<'a> {
    root: &'a Root,
    base: String,
}

impl TurnHandle<'_> {
    fn key(&self, suffix: &str) -> String {
        format!("{}:{}", self.base, suffix)
    }
    /// Packed scores by score name.
    pub fn scores(&self, score_name: &str) -> Vec<u8> {
        self.root
            .store()
            .hget(&self.key("scores"), score_name)
            .unwrap_or_default()
    }
    pub fn set_scores(&self, score_name: &str, scores: &[Score]) {
        self.root
            .store()
            .hset(&self.key("scores"), score_name, &crate::pack_scores(scores));
    }
    /// Packed per-slot turn statuses of this turn.
    pub fn turn_statuses(&self) -> Vec<u8> {
        self.root
            .store()
            .hget(&self.key("info"), "turnstatus")
            .unwrap_or_default()
    }
    pub fn set_turn_statuses(&self, statuses: &[i16]) {
        self.root.store().hset(
            &self.key("info"),
            "turnstatus",
            &crate::pack_turn_statuses(statuses),
        );
    }
    pub fn time(&self) -> Time {
        self.root.store().hget_int(&self.key("info"), "time") as Time
    }
    pub fn set_time(&self, time: Time) {
        self.root.store().hset_int(&self.key("info"), "time", time as i64);
    }
    /// Primary player of a slot at the time of this turn.
    pub fn player_id(&self, slot: Slot) -> String {
        self.root.store().hget_str(&self.key("player"), &slot.to_string())
    }
    pub fn set_player_id(&self, slot: Slot, user: &str) {
        self.root
            .store()
            .hset_str(&self.key("player"), &slot.to_string(), user);
    }
    /// Convenience: the turn state of a slot, if recorded.
    pub fn turn_state(&self, slot: Slot) -> Option<TurnState> {
        crate::unpack_turn_status(&self.turn_statuses(), slot)
            .and_then(|v| TurnState::from_wire(v as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack_scores;
    use nova_store::Store;

    fn make_game(root: &Root, id: GameId, state: GameState) -> Game<'_> {
        let store = root.store();
        store.sadd("game:all", &id.to_string());
        let game = Game::open_unchecked(root, id);
        store.set(&format!("game:{}:type", id), b"public");
        store.set(&format!("game:{}:state", id), state.format().as_bytes());
        store.sadd(&format!("game:state:{}", state.format()), &id.to_string());
        for slot in 1..=NUM_PLAYERS as Slot {
            game.set_slot_status(slot, 1);
        }
        game
    }

    #[test]
    fn open_checks_existence() {
        let root = Root::for_testing(100);
        assert_eq!(Game::open(&root, 7).err(), Some(HostError::GameNotFound));
        make_game(&root, 7, GameState::Joining);
        assert!(Game::open(&root, 7).is_ok());
    }

    #[test]
    fn state_transition_maintains_indexes() {
        let root = Root::for_testing(100);
        let game = make_game(&root, 7, GameState::Joining);
        game.set_state(GameState::Running).unwrap();
        assert_eq!(game.state().unwrap(), GameState::Running);
        assert!(root.store().sismember("game:state:running", "7"));
        assert!(!root.store().sismember("game:state:joining", "7"));
        assert!(root.store().sismember("game:pubstate:running", "7"));
        assert!(!game.history(10).is_empty());
    }

    #[test]
    fn config_round_trip() {
        let root = Root::for_testing(100);
        let game = make_game(&root, 9, GameState::Running);
        game.set_config_int("turn", 12);
        game.set_config_int("lastHostTime", 4000);
        assert_eq!(game.turn_number(), 12);
        assert_eq!(game.last_host_time(), 4000);
        assert_eq!(game.last_player_joined(), None);
        game.set_config_int("lastPlayerJoined", 99);
        assert_eq!(game.last_player_joined(), Some(99));
        game.remove_config("lastPlayerJoined");
        assert_eq!(game.last_player_joined(), None);
    }

    #[test]
    fn referee_score_defaults_to_timscore() {
        let root = Root::for_testing(100);
        let game = make_game(&root, 3, GameState::Running);
        assert_eq!(game.referee_score_name(), "timscore");
        game.set_config("endScoreName", "w");
        assert_eq!(game.referee_score_name(), "w");
    }

    #[test]
    fn slot_subscription_order() {
        let root = Root::for_testing(100);
        let game = make_game(&root, 5, GameState::Joining);
        assert!(!game.is_slot_played(3));
        assert!(game.has_any_open_slot());
        game.push_player_slot(3, "1001");
        game.push_player_slot(3, "1002");
        assert_eq!(game.list_players(3), vec!["1001", "1002"]);
        assert_eq!(game.primary_player(3).unwrap(), "1001");
        assert!(game.is_user_on_game("1001"));
        assert!(game.is_user_on_game_as_primary("1001"));
        assert!(!game.is_user_on_game_as_primary("1002"));
        // Pop removes the most recent replacement first.
        assert_eq!(game.pop_player_slot(3).unwrap(), "1002");
        assert_eq!(game.pop_player_slot(3).unwrap(), "1001");
        assert_eq!(game.pop_player_slot(3), None);
        assert!(!game.is_slot_played(3));
        assert!(!game.is_user_on_game("1001"));
    }

    #[test]
    fn slot_sets() {
        let root = Root::for_testing(100);
        let game = make_game(&root, 5, GameState::Joining);
        game.set_slot_status(4, 0);
        let slots = game.game_slots();
        assert_eq!(slots.len(), 10);
        assert!(!slots.contains(4));
        game.push_player_slot(2, "1001");
        game.push_player_slot(6, "1001");
        let mine = game.slots_by_player("1001");
        assert!(mine.contains(2) && mine.contains(6));
        assert_eq!(mine.len(), 2);
    }

    #[test]
    fn turn_data() {
        let root = Root::for_testing(100);
        let game = make_game(&root, 5, GameState::Running);
        let turn = game.turn(3);
        turn.set_scores("timscore", &[10, 20, 30]);
        assert_eq!(turn.scores("timscore"), pack_scores(&[10, 20, 30]));
        turn.set_turn_statuses(&[1, 0, 17]);
        assert_eq!(turn.turn_state(1), Some(TurnState::Green));
        assert_eq!(turn.turn_state(2), Some(TurnState::Missing));
        assert_eq!(turn.turn_state(3), Some(TurnState::Green));
        assert_eq!(turn.turn_state(4), None);
        turn.set_player_id(1, "1001");
        assert_eq!(turn.player_id(1), "1001");
        assert_eq!(turn.player_id(2), "");
    }

    #[test]
    fn permissions() {
        let root = Root::for_testing(100);
        let game = make_game(&root, 5, GameState::Running);
        game.set_owner("1001");
        assert!(game.has_permission("", PermissionLevel::Admin));
        assert!(game.has_permission("1001", PermissionLevel::Config));
        assert!(game.has_permission("1002", PermissionLevel::Read));
        assert!(!game.has_permission("1002", PermissionLevel::Config));
        game.set_type(GameType::Private).unwrap();
        assert!(!game.has_permission("1002", PermissionLevel::Read));
        game.push_player_slot(1, "1002");
        assert!(game.has_permission("1002", PermissionLevel::Read));
    }
}
