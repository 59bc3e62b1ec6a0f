//! Hack the Campus
//!
//! A capture-the-flag training game in your terminal: work your way
//! across the campus map, crack each building's timed challenge, and
//! submit the flag before the terminal locks.
//!
//! # Game Mechanics
//!
//! - **Timed challenges**: every level runs on a countdown; when it
//!   hits zero the terminal locks until you back out.
//! - **Hints**: one per challenge, paid for with time off the clock.
//! - **Flags**: case-sensitive, exact match, `flag{...}` format.
//! - **Progression**: completing a level unlocks the next node on the
//!   campus map. Progress survives restarts.
//!
//! # Architecture
//!
//! - `game` - challenge lifecycle state machine and roadmap unlocking
//! - `data` - level catalog and challenge resource resolution
//! - `store` - on-disk progress and audio settings records
//! - `audio` - best-effort playback service (music and effect chimes)
//! - `tui` - terminal user interface with ratatui

pub mod audio;
pub mod data;
pub mod game;
pub mod store;
pub mod tui;

pub use game::ChallengeRunner;

/// Number of levels on the campus map.
pub const TOTAL_LEVELS: usize = 5;

/// Game version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for the game
pub type Result<T> = anyhow::Result<T>;

/// Custom error types
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("No such level: {0}")]
    LevelNotFound(usize),
}
