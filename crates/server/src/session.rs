use nova_game::Game;
use nova_game::HostError;
use nova_game::PermissionLevel;
use nova_game::Result;

/// Caller identity of one connection.
///
/// The admin session (no user set) may do anything; a user session is
/// checked against ownership and game visibility per request.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: String,
}

impl Session {
    /// The admin session.
    pub fn admin() -> Self {
        Self::default()
    }
    pub fn user(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
    pub fn user_id(&self) -> &str {
        &self.user
    }
    pub fn is_admin(&self) -> bool {
        self.user.is_empty()
    }
    /// Check a permission against a game, mapping denial to the wire
    /// error.
    pub fn check_permission(&self, game: &Game, level: PermissionLevel) -> Result<()> {
        if game.has_permission(&self.user, level) {
            Ok(())
        } else {
            Err(HostError::PermissionDenied)
        }
    }
}
