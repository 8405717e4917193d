use nova_core::GameId;
use nova_core::NUM_PLAYERS;
use nova_core::Slot;
use nova_game::Game;
use nova_game::GameState;
use nova_game::GameType;
use nova_game::Result;
use nova_game::Root;
use nova_schedule::ScheduleStack;
use nova_store::Store;
use nova_store::StoreExt;

/// Creates and clones games in the store.
///
/// The host-file directory tree (`games/NNNN/` with `data/`, `backup/`,
/// `in/`, `out/`) belongs to the filer collaborator; this only records
/// the directory name the filer will use.
pub struct GameCreator<'a> {
    root: &'a Root,
}

impl<'a> GameCreator<'a> {
    pub fn new(root: &'a Root) -> Self {
        Self { root }
    }

    /// Allocate a new game id and its directory name.
    pub fn create_new_game(&self) -> GameId {
        let id = self.root.store().incr("game:lastid", 1) as GameId;
        let dir = format!("games/{:04}", id);
        self.root
            .store()
            .set(&format!("game:{}:dir", id), dir.as_bytes());
        id
    }

    /// Write the initial configuration of a freshly allocated game.
    pub fn initialize_game(&self, id: GameId) {
        let store = self.root.store();
        store.set(&format!("game:{}:name", id), b"New Game");
        store.set(&format!("game:{}:owner", id), b"");
        store.set_int(&format!("game:{}:schedule:lastId", id), 0);
        let settings = format!("game:{}:settings", id);
        store.hset_str(&settings, "description", "New Game");
        store.hset_str(&settings, "host", &self.root.config().default_host);
        store.hset_str(&settings, "master", &self.root.config().default_master);
        store.hset_str(&settings, "shiplist", &self.root.config().default_ship_list);
        for slot in 1..=NUM_PLAYERS as Slot {
            let status = format!("game:{}:player:{}:status", id, slot);
            store.hset_int(&status, "slot", 1);
            store.hset_int(&status, "turn", 0);
        }
    }

    /// Copy slots, schedules, tools, and the stable settings of one game
    /// into another. Runtime state (turn, host times, trigger flags)
    /// deliberately stays behind.
    pub fn copy_game(&self, src_id: GameId, dst_id: GameId) {
        let store = self.root.store();

        // Number the clone after the original.
        let src_name = store.get_str(&format!("game:{}:name", src_id));
        let serial = store.hincr("game:bynameprefix", &src_name, 1);
        store.set(
            &format!("game:{}:name", dst_id),
            format!("{} {}", src_name, serial).as_bytes(),
        );

        // Slot availability carries over; turns reset.
        for slot in 1..=NUM_PLAYERS as Slot {
            let src = format!("game:{}:player:{}:status", src_id, slot);
            let dst = format!("game:{}:player:{}:status", dst_id, slot);
            store.hset_int(&dst, "slot", store.hget_int(&src, "slot"));
            store.hset_int(&dst, "turn", 0);
        }

        // Schedules carry over on a freshly picked daytime.
        let daytime = self.pick_day_time();
        let src_stack = ScheduleStack::new(format!("game:{}:schedule", src_id));
        let dst_stack = ScheduleStack::new(format!("game:{}:schedule", dst_id));
        for mut schedule in src_stack.all(store).into_iter().rev() {
            schedule.daytime = daytime;
            dst_stack.push_front(store, &schedule);
        }

        // Stable settings only; no host times, no triggers, no turn.
        const FIELDS_TO_COPY: [&str; 11] = [
            "description",
            "host",
            "master",
            "shiplist",
            "endCondition",
            "endTurn",
            "endProbability",
            "endScore",
            "endScoreName",
            "rankDisable",
            "joinMulti",
        ];
        let src_settings = format!("game:{}:settings", src_id);
        let dst_settings = format!("game:{}:settings", dst_id);
        for field in FIELDS_TO_COPY {
            if let Some(value) = store.hget(&src_settings, field) {
                store.hset(&dst_settings, field, &value);
            }
        }
        store.hset_int(&dst_settings, "masterHasRun", 0);
        store.hset_int(&dst_settings, "copyOf", src_id as i64);

        // Tools and their per-game settings.
        for tool in store.smembers(&format!("game:{}:tools", src_id)) {
            store.sadd(&format!("game:{}:tools", dst_id), &tool);
            let src_tool = format!("game:{}:tool:{}:settings", src_id, tool);
            let dst_tool = format!("game:{}:tool:{}:settings", dst_id, tool);
            for (field, value) in store.hgetall(&src_tool) {
                store.hset(&dst_tool, &field, &value);
            }
            let kind = store.hget_str(&format!("tool:{}", tool), "kind");
            if !kind.is_empty() {
                store.hset_str(&format!("game:{}:toolkind", dst_id), &kind, &tool);
            }
        }
    }

    /// Put a new game into the index sets and its target state, going
    /// through the regular transition handling.
    pub fn finish_new_game(&self, id: GameId, state: GameState, game_type: GameType) -> Result<()> {
        let store = self.root.store();
        store.set(&format!("game:{}:state", id), GameState::Preparing.format().as_bytes());
        store.set(&format!("game:{}:type", id), game_type.format().as_bytes());
        store.sadd("game:state:preparing", &id.to_string());
        if game_type == GameType::Public {
            store.sadd("game:pubstate:preparing", &id.to_string());
        }
        store.sadd("game:all", &id.to_string());
        Game::open_unchecked(self.root, id).set_state(state)
    }

    /// Pick the least loaded hour of the day for a new game's hosts,
    /// starting the search at 06:00, and account for the choice.
    pub fn pick_day_time(&self) -> i32 {
        let store = self.root.store();
        let mut best_hour = 6;
        let mut best_load = 0;
        for i in 0..24 {
            let hour = (6 + i) % 24;
            let load = store.hget_int("game:hours", &hour.to_string());
            if i == 0 || load < best_load {
                best_hour = hour;
                best_load = load;
            }
        }
        store.hincr("game:hours", &best_hour.to_string(), 1);
        60 * best_hour as i32
    }
}
