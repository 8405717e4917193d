//! Core type aliases, traits, and constants for the nova host stack.
//!
//! This crate provides the foundational scalar types and configuration
//! parameters used throughout the nova workspace: internal vs. user time,
//! player identities and sets, and the deterministic random number
//! generator that drives combat simulation.

mod player;
mod rng;
mod time;

pub use player::*;
pub use rng::*;
pub use time::*;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Game identifier as allocated by the game creator.
pub type GameId = i32;
/// Slot number within a game, 1-based.
pub type Slot = i32;
/// Turn number; 0 means the game has not been mastered yet.
pub type Turn = i32;
/// Score value as published per slot per turn.
pub type Score = i32;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for testing.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

// ============================================================================
// GAME PARAMETERS
// ============================================================================
/// Number of player slots in a game.
pub const NUM_PLAYERS: usize = 11;

// ============================================================================
// SCHEDULER PARAMETERS
// ============================================================================
/// Delay between the last player joining and the master run (minutes).
pub const MASTER_DELAY: Time = 15;
/// Minimum delay between a schedule edit and the next host run (minutes).
/// A freshly edited schedule must not fire an instantaneous host.
pub const SCHEDULE_CHANGE_GRACE: Time = 10;
/// Default poll interval of the cron worker (minutes).
pub const CRON_POLL_INTERVAL: Time = 10;
/// Default number of consecutively missed turns before an inactivity kick.
pub const DEFAULT_MISSED_TURNS_FOR_KICK: i32 = 5;

// ============================================================================
// RELIABILITY PARAMETERS
// A 90% reliable player stores 90 * RELIABILITY_SCALE. The scale affects
// storage and must stay constant for a database instance; speed and penalty
// affect formulas only.
// ============================================================================
/// Storage scale factor for turn reliabilities.
pub const RELIABILITY_SCALE: i32 = 1000;
/// EWMA speed in percent; at 100 the newest score replaces the old value.
pub const RELIABILITY_SPEED: i32 = 3;
/// Drop penalty in percent; at 100 a leading player dropping keeps nothing.
pub const DROP_PENALTY: i32 = 66;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Message format shared by every log sink: module tags carry the
/// context, so source locations and thread ids stay off.
fn log_format() -> simplelog::Config {
    simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build()
}

/// Terminal-only logging for interactive tools and tests.
pub fn log_terminal(level: log::LevelFilter) {
    simplelog::TermLogger::init(
        level,
        log_format(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .expect("initialize logger");
}

/// Daemon logging: INFO on the terminal plus a full DEBUG file per
/// launch under `dir`, named `hostd-<minutes-since-epoch>.log`.
pub fn log_daemon(dir: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let file = std::fs::File::create(format!("{}/hostd-{}.log", dir, now()))?;
    simplelog::CombinedLogger::init(vec![
        simplelog::TermLogger::new(
            log::LevelFilter::Info,
            log_format(),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        ),
        simplelog::WriteLogger::new(log::LevelFilter::Debug, log_format(), file),
    ])
    .expect("initialize logger");
    Ok(())
}

/// Current wall-clock time in minutes since the 1970-01-01 epoch.
pub fn now() -> Time {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    (secs / 60) as Time
}
