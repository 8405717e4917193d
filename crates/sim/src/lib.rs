//! Battle orchestrator for the nova host stack.
//!
//! Takes a simulated fleet (ships plus at most one planet), pairs up the
//! combatants, drives the combat engine over the resulting fights in
//! battle order, and aggregates the outcome into a [`SimResult`].
//!
//! - [`Ship`], [`Planet`] — simulation units with intent (friendly code,
//!   aggressiveness, intercept) on top of combat state
//! - [`Setup`] — the fleet under simulation
//! - [`Options`] — algorithm selection, bonuses, alliances, balancing
//! - [`simulate`] — one deterministic pass
//!
//! The orchestrator is pure with respect to `(setup, options, ship list,
//! configs, rng)`: identical inputs produce identical results. Under seed
//! control the caller's generator is never advanced (except by FLAK,
//! which always draws its seed — observed host behavior).

mod options;
mod planet;
mod result;
mod run;
mod setup;
mod ship;

pub use options::*;
pub use planet::*;
pub use result::*;
pub use run::*;
pub use setup::*;
pub use ship::*;
