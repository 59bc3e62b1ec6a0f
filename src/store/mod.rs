//! On-disk persistence for the two records the game keeps between runs
//!
//! Everything in here is best-effort: a read that fails for any reason
//! yields defaults, a write that fails is logged and dropped. Storage
//! problems never reach the player.

pub mod progress;
pub mod settings;

pub use progress::ProgressStore;
pub use settings::{AudioSettings, AudioSettingsStore};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Filesystem layout of the game's data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Default location: `~/.hack-the-campus/`.
    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hack-the-campus")
    }

    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn progress_file(&self) -> PathBuf {
        self.root.join("progress.json")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join("game.log")
    }

    /// Folder that materialized challenge resources are written into.
    pub fn downloads_dir(&self) -> PathBuf {
        self.root.join("downloads")
    }
}

/// Read a file and parse it as JSON. Any failure (missing file,
/// unreadable, not JSON) comes back as `None`.
pub(crate) fn read_json(path: &Path) -> Option<serde_json::Value> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(path = %path.display(), %err, "no stored record");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path = %path.display(), %err, "stored record is not valid JSON");
            None
        }
    }
}

/// Serialize a value to JSON and write it, creating the parent
/// directory if needed. Failures are logged and swallowed.
pub(crate) fn write_json(path: &Path, value: &serde_json::Value) {
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            warn!(path = %parent.display(), %err, "could not create data directory");
            return;
        }
    }
    match serde_json::to_string(value) {
        Ok(raw) => {
            if let Err(err) = fs::write(path, raw) {
                warn!(path = %path.display(), %err, "could not persist record");
            }
        }
        Err(err) => warn!(%err, "could not serialize record"),
    }
}
