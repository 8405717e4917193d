//! Command surface for the nova host stack.
//!
//! A RESP-style line protocol, one verb per line with positional
//! arguments, served over TCP:
//!
//! - [`Host`] — shared service state (root + arbiter)
//! - [`Session`] — per-connection caller identity
//! - [`GameCreator`] — NEWGAME and CLONEGAME plumbing
//! - [`GameService`], [`ScheduleService`], [`PlayerService`],
//!   [`HistoryService`] — the verb implementations
//! - [`handle_command`] — parse and dispatch one line
//! - [`serve`] — the tokio accept loop
//!
//! Every error kind of the domain taxonomy maps to one wire reply code;
//! see `nova_game::HostError`.

mod creator;
mod games;
mod history;
mod players;
mod protocol;
mod schedules;
mod server;
mod session;

pub use creator::*;
pub use games::*;
pub use history::*;
pub use players::*;
pub use protocol::*;
pub use schedules::*;
pub use server::*;
pub use session::*;

use nova_cron::GameArbiter;
use nova_game::Root;
use std::sync::Arc;

/// Shared state of the command surface.
pub struct Host {
    pub root: Arc<Root>,
    pub arbiter: Arc<GameArbiter>,
}

impl Host {
    pub fn new(root: Arc<Root>, arbiter: Arc<GameArbiter>) -> Self {
        Self { root, arbiter }
    }
}
