//! Host schedule descriptors and evaluation.
//!
//! A game can have multiple schedules, stacked front-to-back. Each
//! schedule can carry an expiration condition (turn or time) after which
//! it is dropped and the next one takes over. This models rules like
//! "thrice a week until turn 25, then twice a week" or "pause until
//! date".
//!
//! - [`Schedule`] — one descriptor: kind, weekday mask, interval,
//!   daytime, host-early, host-delay, host-limit, expiration
//! - [`Schedule::next_host`] — the next on-schedule host time
//! - [`Schedule::previous_virtual_host`] — the host slot that would have
//!   preceded a reference time, used when schedules change
//! - [`Schedule::is_expired`] — expiration test against turn and time
//!
//! Persistence is a flat store hash; wire integers are 0 stopped,
//! 1 weekly, 2 daily, 3 quick, 4 manual and 0 none, 1 turn, 2 time.

mod descriptor;
mod stack;

pub use descriptor::*;
pub use stack::*;
