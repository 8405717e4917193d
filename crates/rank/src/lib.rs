//! Player reliability and ranking.
//!
//! - [`LevelHandler`] — the reliability ledger: EWMA of turn submissions,
//!   drop penalties, and rank promotion/demotion against the fixed
//!   threshold table
//! - [`victory`] — built-in end conditions and end-of-game rank points
//!
//! The table and formulas are process-wide constants; all arithmetic is
//! scaled-integer with explicit truncation.

mod levels;
pub mod victory;

pub use levels::*;
