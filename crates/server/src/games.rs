use crate::GameCreator;
use crate::Host;
use crate::Session;
use nova_core::GameId;
use nova_core::NUM_PLAYERS;
use nova_core::Slot;
use nova_cron::LockLevel;
use nova_game::Game;
use nova_game::GameState;
use nova_game::GameType;
use nova_game::HostError;
use nova_game::PermissionLevel;
use nova_game::Result;
use nova_game::SlotState;
use serde::Serialize;

/// Client-facing description of one game.
#[derive(Debug, Clone, Serialize)]
pub struct GameInfo {
    pub id: GameId,
    pub state: GameState,
    pub game_type: GameType,
    pub name: String,
    pub owner: String,
    pub turn: i32,
    pub slot_states: Vec<SlotState>,
    pub last_host_time: i64,
}

/// Game-level verbs: creation, cloning, state and config mutation.
pub struct GameService<'a> {
    host: &'a Host,
}

impl<'a> GameService<'a> {
    pub fn new(host: &'a Host) -> Self {
        Self { host }
    }

    /// NEWGAME: allocate a fresh game in `preparing`.
    pub fn new_game(&self, session: &Session) -> Result<GameId> {
        if !session.is_admin() {
            return Err(HostError::PermissionDenied);
        }
        let creator = GameCreator::new(&self.host.root);
        let id = creator.create_new_game();
        creator.initialize_game(id);
        creator.finish_new_game(id, GameState::Preparing, GameType::Private)?;
        log::info!("[server] created game {}", id);
        Ok(id)
    }

    /// CLONEGAME: copy slots, schedules, tools, and settings.
    pub fn clone_game(
        &self,
        session: &Session,
        src_id: GameId,
        state: Option<GameState>,
    ) -> Result<GameId> {
        let _guard = self.host.arbiter.lock(src_id, LockLevel::Critical);
        let src = Game::open(&self.host.root, src_id)?;
        if !session.is_admin() && src.owner() != session.user_id() {
            return Err(HostError::PermissionDenied);
        }
        let creator = GameCreator::new(&self.host.root);
        let id = creator.create_new_game();
        creator.initialize_game(id);
        creator.copy_game(src_id, id);
        creator.finish_new_game(id, state.unwrap_or(GameState::Joining), GameType::Private)?;
        log::info!("[server] cloned game {} from {}", id, src_id);
        Ok(id)
    }

    /// GAMESETSTATE.
    pub fn set_state(&self, session: &Session, game_id: GameId, state: GameState) -> Result<()> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Critical);
        let game = Game::open(&self.host.root, game_id)?;
        session.check_permission(&game, PermissionLevel::Config)?;
        game.set_state(state)
    }

    /// GAMESETTYPE.
    pub fn set_type(&self, session: &Session, game_id: GameId, game_type: GameType) -> Result<()> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Critical);
        let game = Game::open(&self.host.root, game_id)?;
        session.check_permission(&game, PermissionLevel::Config)?;
        game.set_type(game_type)
    }

    /// GAMESETOWNER.
    pub fn set_owner(&self, session: &Session, game_id: GameId, owner: &str) -> Result<()> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Critical);
        let game = Game::open(&self.host.root, game_id)?;
        session.check_permission(&game, PermissionLevel::Config)?;
        game.set_owner(owner);
        Ok(())
    }

    /// GAMESETNAME.
    pub fn set_name(&self, session: &Session, game_id: GameId, name: &str) -> Result<()> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Critical);
        let game = Game::open(&self.host.root, game_id)?;
        session.check_permission(&game, PermissionLevel::Config)?;
        game.set_name(name);
        Ok(())
    }

    /// GAMESET: bulk configuration. End-condition keys raise the
    /// end-changed flag, everything else the config-changed flag; the
    /// scheduler is notified either way.
    pub fn set_config(
        &self,
        session: &Session,
        game_id: GameId,
        entries: &[(String, String)],
    ) -> Result<()> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Critical);
        let game = Game::open(&self.host.root, game_id)?;
        session.check_permission(&game, PermissionLevel::Config)?;
        for (key, value) in entries {
            game.set_config(key, value);
            if key.starts_with("end") {
                game.set_end_changed(true);
            } else {
                game.set_config_changed(true);
            }
        }
        self.host.root.handle_game_change(game_id);
        Ok(())
    }

    /// GAMEGET: one configuration value.
    pub fn get_config(&self, session: &Session, game_id: GameId, key: &str) -> Result<String> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Simple);
        let game = Game::open(&self.host.root, game_id)?;
        session.check_permission(&game, PermissionLevel::Read)?;
        Ok(game.get_config(key))
    }

    /// GAMESTAT: describe one game from the caller's point of view.
    pub fn describe(&self, session: &Session, game_id: GameId) -> Result<GameInfo> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Simple);
        let game = Game::open(&self.host.root, game_id)?;
        session.check_permission(&game, PermissionLevel::Read)?;
        let slot_states = (1..=NUM_PLAYERS as Slot)
            .map(|slot| {
                if !game.is_slot_in_game(slot) {
                    SlotState::Dead
                } else if !game.is_slot_played(slot) {
                    SlotState::Open
                } else if game
                    .list_players(slot)
                    .iter()
                    .any(|u| u == session.user_id())
                {
                    SlotState::Self_
                } else {
                    SlotState::Occupied
                }
            })
            .collect();
        Ok(GameInfo {
            id: game_id,
            state: game.state()?,
            game_type: game.game_type()?,
            name: game.name(),
            owner: game.owner(),
            turn: game.turn_number(),
            slot_states,
            last_host_time: game.last_host_time() as i64,
        })
    }
}
