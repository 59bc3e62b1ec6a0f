//! Core game logic
//!
//! The challenge runner owns the lifecycle of one active level; the
//! roadmap module derives which map nodes are open from the saved
//! progress record.

pub mod challenge;
pub mod roadmap;

pub use challenge::{ChallengeRunner, RunnerState, StatusLine, format_clock};
pub use roadmap::{flags_captured, unlocked_nodes};
