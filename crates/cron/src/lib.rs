//! Host scheduler for the nova host stack.
//!
//! Decides, for each game, when the next host run, master run, or
//! schedule change happens:
//!
//! - [`compute_game_times`] — the per-game scheduling state machine
//! - [`preview_schedule`] — future host times for SCHEDULESHOW
//! - [`process_inactivity_kicks`] — unsubscribe slots that stopped
//!   playing
//! - [`GameArbiter`] — per-game critical/simple locking
//! - [`Cron`] — the single-threaded worker driving it all
//!
//! The worker serializes external commands against the background host
//! runner; it never cancels a running host, it only decides when the
//! next one starts.

mod arbiter;
mod cron;
mod event;
mod kicks;
mod times;

pub use arbiter::*;
pub use cron::*;
pub use event::*;
pub use kicks::*;
pub use times::*;
