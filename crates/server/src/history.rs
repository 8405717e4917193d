use crate::Host;
use crate::Session;
use nova_core::GameId;
use nova_cron::LockLevel;
use nova_game::Game;
use nova_game::PermissionLevel;
use nova_game::Result;
use nova_game::User;

/// Default number of history items returned by the HIST verbs.
const DEFAULT_LIMIT: usize = 100;

/// History retrieval: `time:what:gameId:args` items, newest first.
pub struct HistoryService<'a> {
    host: &'a Host,
}

impl<'a> HistoryService<'a> {
    pub fn new(host: &'a Host) -> Self {
        Self { host }
    }

    /// GAMEHIST: a game's event history.
    pub fn game_history(
        &self,
        session: &Session,
        game_id: GameId,
        limit: Option<usize>,
    ) -> Result<Vec<String>> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Simple);
        let game = Game::open(&self.host.root, game_id)?;
        session.check_permission(&game, PermissionLevel::Read)?;
        Ok(game.history(limit.unwrap_or(DEFAULT_LIMIT)))
    }

    /// USERHIST: a user's event history. Users see their own; admins see
    /// everyone's.
    pub fn user_history(
        &self,
        session: &Session,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<String>> {
        if !session.is_admin() && session.user_id() != user_id {
            return Err(nova_game::HostError::PermissionDenied);
        }
        Ok(User::new(&self.host.root, user_id).history(limit.unwrap_or(DEFAULT_LIMIT)))
    }
}
