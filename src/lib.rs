//! Card-reader stations, match engine and rating ledger for office games.
//!
//! Players tap identity cards on reader stations to join a match, points are
//! pressed in as the match goes, and finished matches feed a persistent
//! per-player rating ledger.
//!
//! ## Modules
//!
//! - [`cards`]: Card identifiers and serial tag re-encodings
//! - [`readers`]: Device discovery and raw signal → card events (keystream and serial)
//! - [`rating`]: ELO, two-team skill rating and per-game-kind strategy
//! - [`session`]: In-memory state of one match in progress
//! - [`engine`]: Match lifecycle state machine and its async shell
//! - `settings`: `OG_*` environment configuration (feature `server`)
#![allow(dead_code)]

pub mod cards;
pub mod engine;
pub mod rating;
pub mod readers;
pub mod session;
#[cfg(feature = "server")]
pub mod settings;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Points scored by one team in a match.
pub type Points = u16;
/// ELO rating of a player.
pub type Elo = i32;

// ============================================================================
// CARD READERS
// ============================================================================
/// Characters in a keystream card uid (Mifare Classic NUID as 8 hex chars).
pub const CARD_LENGTH: usize = 8;
/// Bytes requested from a device per read.
pub const READ_CHUNK: usize = 256;

// ============================================================================
// SCORING RULES
// ============================================================================
/// Points needed to win a match.
pub const WIN_POINTS: Points = 11;
/// Lead needed over the opponent at the moment of winning.
pub const WIN_MARGIN: Points = 2;
/// Once either team has this many points the serve flips every point.
pub const DEUCE_POINTS: Points = 10;

// ============================================================================
// RATINGS
// ============================================================================
/// ELO rating given to a freshly registered player.
pub const ELO_DEFAULT: Elo = 1200;
/// ELO K-factor.
pub const ELO_K: f64 = 32.0;
/// Initial skill mean.
pub const SKILL_MU: f64 = 25.0;
/// Initial skill uncertainty.
pub const SKILL_SIGMA: f64 = SKILL_MU / 3.0;
/// Performance variance around skill.
pub const SKILL_BETA: f64 = SKILL_SIGMA / 2.0;
/// Dynamics added to uncertainty before every update.
pub const SKILL_TAU: f64 = SKILL_SIGMA / 100.0;
/// Prior probability that a match ends in a draw.
pub const SKILL_DRAW_PROBABILITY: f64 = 0.10;

// ============================================================================
// TIMEOUTS (seconds)
// ============================================================================
/// A pending card registration expires after this long.
pub const CARD_REGISTRATION_TIMEOUT: u64 = 60 * 60;
/// A lone player waits this long for an opponent before the session resets.
pub const PLAYER_REGISTRATION_TIMEOUT: u64 = 30;
/// An active session without a winner expires after this long.
pub const SESSION_TIMEOUT: u64 = 15 * 60;
/// Interval of the background staleness check.
pub const WATCHDOG_INTERVAL: u64 = 10;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Station logging: INFO and above to the terminal, the full DEBUG trace of
/// reads, presses and mirror writes to `logs/<unix seconds>.log`.
#[cfg(feature = "server")]
pub fn log() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time))?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file])?;
    Ok(())
}

/// Milliseconds since the unix epoch, saturating at zero for earlier times.
pub fn millis(time: std::time::SystemTime) -> u64 {
    time.duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
