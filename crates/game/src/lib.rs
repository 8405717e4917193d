//! Persisted game model for the nova host stack.
//!
//! Implements the store schema shared by the scheduler, the ranking
//! subsystem, and the command surface:
//!
//! - [`GameState`], [`GameType`], [`SlotState`], [`TurnState`] — wire
//!   enumerations with parse/format round-trips
//! - [`Game`] — handle to one game: state, configuration, slots, turns
//! - [`User`] — handle to one user profile
//! - [`Root`] — service root: store, configuration, mail queue, clock,
//!   scheduler change notifications
//! - [`HostError`] — the error taxonomy of the command surface
//! - score and turn-status packing (little-endian arrays)

mod error;
mod game;
mod mail;
mod packing;
mod root;
mod state;
mod user;

pub use error::*;
pub use game::*;
pub use mail::*;
pub use packing::*;
pub use root::*;
pub use state::*;
pub use user::*;
