//! Audio settings record
//!
//! Two volume percentages, stored as a JSON object. Each field is
//! validated on its own: a missing or non-numeric field falls back to
//! its default, and every value is clamped into 0-100.

use std::path::PathBuf;

use serde_json::{Value, json};

use super::{read_json, write_json};

pub const DEFAULT_BACKGROUND: u8 = 60;
pub const DEFAULT_EFFECTS: u8 = 80;

/// Background music and sound effect volumes, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSettings {
    pub background: u8,
    pub effects: u8,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            effects: DEFAULT_EFFECTS,
        }
    }
}

/// Reads and writes the audio settings record.
#[derive(Debug, Clone)]
pub struct AudioSettingsStore {
    path: PathBuf,
}

impl AudioSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the settings pair, defaulting per-field when storage is
    /// absent or malformed.
    pub fn load(&self) -> AudioSettings {
        let Some(Value::Object(map)) = read_json(&self.path) else {
            return AudioSettings::default();
        };
        AudioSettings {
            background: volume_field(map.get("background"), DEFAULT_BACKGROUND),
            effects: volume_field(map.get("effects"), DEFAULT_EFFECTS),
        }
    }

    /// Clamp and persist the pair, returning what was stored. The
    /// caller re-applies the result to the playback layer so volume
    /// changes take effect immediately.
    pub fn save(&self, background: i64, effects: i64) -> AudioSettings {
        let settings = AudioSettings {
            background: background.clamp(0, 100) as u8,
            effects: effects.clamp(0, 100) as u8,
        };
        write_json(
            &self.path,
            &json!({ "background": settings.background, "effects": settings.effects }),
        );
        settings
    }
}

fn volume_field(value: Option<&Value>, default: u8) -> u8 {
    match value.and_then(Value::as_f64) {
        Some(v) => v.clamp(0.0, 100.0) as u8,
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> AudioSettingsStore {
        AudioSettingsStore::new(dir.path().join("settings.json"))
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).load(), AudioSettings::default());
    }

    #[test]
    fn malformed_payloads_load_defaults() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        for raw in ["garbage", "[60, 80]", "\"loud\""] {
            fs::write(dir.path().join("settings.json"), raw).unwrap();
            assert_eq!(s.load(), AudioSettings::default(), "payload: {raw}");
        }
    }

    #[test]
    fn fields_fall_back_independently() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            "{\"background\": 25, \"effects\": \"loud\"}",
        )
        .unwrap();
        let loaded = store(&dir).load();
        assert_eq!(loaded.background, 25);
        assert_eq!(loaded.effects, DEFAULT_EFFECTS);
    }

    #[test]
    fn out_of_range_values_are_clamped_on_load() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            "{\"background\": 250, \"effects\": -3}",
        )
        .unwrap();
        let loaded = store(&dir).load();
        assert_eq!(loaded.background, 100);
        assert_eq!(loaded.effects, 0);
    }

    #[test]
    fn save_clamps_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        let saved = s.save(130, -10);
        assert_eq!(
            saved,
            AudioSettings {
                background: 100,
                effects: 0
            }
        );
        assert_eq!(s.load(), saved);
    }
}
