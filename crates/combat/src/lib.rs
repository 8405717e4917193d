//! Deterministic combat engine for the nova host stack.
//!
//! Reproduces the turn-resolution battle logic of the historical host
//! programs as integer state machines: identical inputs and seed yield
//! identical battles, on every platform, forever. No floating point, no
//! I/O, no global state; the hot loop allocates nothing.
//!
//! ## Model
//!
//! - [`Object`] — one battle participant (ship or planet) with weapons,
//!   rates, and hit state
//! - [`Battle`] — immutable record of one fight: initial state, final
//!   state, roles, per-participant statistics
//! - [`Statistic`] — min-fighters-aboard, torpedo hits, fight count
//!
//! ## Algorithms
//!
//! - [`Algorithm`] — selector over the five supported combat algorithms
//! - [`classic`] — Classic Host and the NuHost variant
//! - [`phost`] — PHost 2 and PHost 3/4 (roles, experience modifiers)
//! - [`flak`] — the many-participant fleet brawl
//!
//! Failure semantics: inconsistent input (negative counts, unknown ids)
//! is a precondition violation by the caller. The engine asserts in debug
//! builds and produces garbage-in-garbage-out otherwise; it never errors.

mod algorithm;
mod battle;
mod config;
mod object;
mod statistic;
mod weapons;

pub mod classic;
pub mod flak;
pub mod phost;

pub use algorithm::*;
pub use battle::*;
pub use config::*;
pub use object::*;
pub use statistic::*;
pub use weapons::*;
