use crate::Host;
use crate::Session;
use nova_core::GameId;
use nova_core::Slot;
use nova_cron::LockLevel;
use nova_cron::drop_slot_if_dead;
use nova_game::Game;
use nova_game::GameState;
use nova_game::GameType;
use nova_game::HostError;
use nova_game::PermissionLevel;
use nova_game::Result;
use nova_game::User;
use nova_store::Store;

/// Player-management verbs: join, substitute, resign, add.
pub struct PlayerService<'a> {
    host: &'a Host,
}

impl<'a> PlayerService<'a> {
    pub fn new(host: &'a Host) -> Self {
        Self { host }
    }

    fn open_joinable<'r>(&'r self, game_id: GameId) -> Result<Game<'r>> {
        let game = Game::open(&self.host.root, game_id)?;
        let state = game.state()?;
        if state != GameState::Joining && state != GameState::Running {
            return Err(HostError::WrongGameState);
        }
        Ok(game)
    }

    /// PLAYERJOIN: subscribe a user to an empty slot.
    ///
    /// Admins and the owner may place anyone; users join public and
    /// unlisted games themselves, once, unless multi-join is allowed.
    pub fn join(&self, session: &Session, game_id: GameId, slot: Slot, user_id: &str) -> Result<()> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Critical);
        let game = self.open_joinable(game_id)?;
        session.check_permission(&game, PermissionLevel::Read)?;
        if !User::exists(&self.host.root, user_id) {
            return Err(HostError::UserNotFound);
        }

        let game_type = game.game_type()?;
        let is_admin_access = session.is_admin() || session.user_id() == game.owner();
        let self_joinable = matches!(game_type, GameType::Public | GameType::Unlisted)
            && session.user_id() == user_id;
        if !(is_admin_access || self_joinable) {
            return Err(HostError::PermissionDenied);
        }
        if !is_admin_access && game.is_user_on_game_as_primary(user_id) && !game.is_multi_join_allowed()
        {
            return Err(HostError::PermissionDenied);
        }
        if !game.is_slot_in_game(slot) || game.is_slot_played(slot) {
            return Err(HostError::SlotNotAvailable);
        }

        game.push_player_slot(slot, user_id);
        let what = if user_id == session.user_id() {
            "game-join"
        } else {
            "game-join-other"
        };
        game.add_user_history_item(what, &format!("{}:{}", user_id, slot), user_id);
        if !game.has_any_open_slot() {
            // The scheduler needs this to time the master run. We hold
            // the critical lock, so it cannot observe a partial state.
            game.set_config_int("lastPlayerJoined", self.host.root.time() as i64);
            self.host.root.handle_game_change(game_id);
        }
        Ok(())
    }

    /// PLAYERSUBST: cut the replacement chain at a user, or append them.
    pub fn substitute(
        &self,
        session: &Session,
        game_id: GameId,
        slot: Slot,
        user_id: &str,
    ) -> Result<()> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Critical);
        let game = self.open_joinable(game_id)?;
        session.check_permission(&game, PermissionLevel::Read)?;

        let players = game.list_players(slot);
        if players.is_empty() {
            // An empty slot is joined, not substituted.
            return Err(HostError::SlotEmpty);
        }
        let user_index = players.iter().position(|u| u == user_id);

        if session.is_admin() || session.user_id() == game.owner() {
            match user_index {
                None => game.push_player_slot(slot, user_id),
                Some(index) => {
                    while game.list_players(slot).len() > index + 1 {
                        game.pop_player_slot(slot);
                    }
                }
            }
        } else {
            let caller_index = players
                .iter()
                .position(|u| u == session.user_id())
                .ok_or(HostError::PermissionDenied)?;
            if user_index.map(|u| u < caller_index).unwrap_or(false) {
                // Cannot cut off players ahead of yourself.
                return Err(HostError::PermissionDenied);
            }
            while game.list_players(slot).len() > caller_index + 1 {
                game.pop_player_slot(slot);
            }
            if user_index != Some(caller_index) {
                game.push_player_slot(slot, user_id);
            }
        }
        game.add_user_history_item("game-subst", &format!("{}:{}", user_id, slot), user_id);
        Ok(())
    }

    /// PLAYERRESIGN: remove a user and everyone behind them.
    pub fn resign(&self, session: &Session, game_id: GameId, slot: Slot, user_id: &str) -> Result<()> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Critical);
        let game = self.open_joinable(game_id)?;
        session.check_permission(&game, PermissionLevel::Read)?;

        let players = game.list_players(slot);
        let user_index = players
            .iter()
            .position(|u| u == user_id)
            .ok_or(HostError::PermissionDenied)?;
        // Callers may resign themselves and their replacements; owner
        // and admin may resign anyone.
        let caller_index = players.iter().position(|u| u == session.user_id());
        let caller_ahead = caller_index.map(|c| c <= user_index).unwrap_or(false);
        if !caller_ahead && !session.is_admin() && game.owner() != session.user_id() {
            return Err(HostError::PermissionDenied);
        }

        while game.list_players(slot).len() > user_index {
            game.pop_player_slot(slot);
        }

        if user_index == 0 {
            // The slot lost its primary player: maybe close it, tell
            // history, and let the scheduler recompute (a joining game
            // stops its master run, a run-when-all-in game may host).
            let dead = drop_slot_if_dead(&game, slot)?;
            let what = if user_id == session.user_id() {
                if dead { "game-resign-dead" } else { "game-resign" }
            } else {
                "game-resign-other"
            };
            game.add_user_history_item(what, &format!("{}:{}", user_id, slot), user_id);
            self.host.root.handle_game_change(game_id);
        }
        Ok(())
    }

    /// PLAYERADD: grant a user access to a private game without a slot.
    pub fn add(&self, session: &Session, game_id: GameId, user_id: &str) -> Result<()> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Simple);
        let game = Game::open(&self.host.root, game_id)?;
        if !session.is_admin() && session.user_id() != game.owner() {
            return Err(HostError::PermissionDenied);
        }
        if !User::exists(&self.host.root, user_id) {
            return Err(HostError::UserNotFound);
        }
        self.host
            .root
            .store()
            .hincr(&format!("game:{}:users", game_id), user_id, 1);
        Ok(())
    }
}
