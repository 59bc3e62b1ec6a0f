//! Level completion record
//!
//! A flat array of booleans, index i = level i+1 completed. The stored
//! form is a JSON array; anything that doesn't parse into one degrades
//! to all-false.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use super::{read_json, write_json};

/// Reads and writes the per-level completion record.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load a validated record of exactly `levels` entries. Never
    /// fails: missing or malformed storage yields all-false, and a
    /// stored array of the wrong length is truncated or padded.
    pub fn load(&self, levels: usize) -> Vec<bool> {
        let Some(value) = read_json(&self.path) else {
            return vec![false; levels];
        };
        let Value::Array(entries) = value else {
            return vec![false; levels];
        };
        let mut record: Vec<bool> = entries.iter().take(levels).map(truthy).collect();
        record.resize(levels, false);
        record
    }

    /// Persist the record. Best-effort: storage failures are logged
    /// and dropped.
    pub fn save(&self, progress: &[bool]) {
        let value = Value::Array(progress.iter().map(|&v| Value::Bool(v)).collect());
        write_json(&self.path, &value);
    }

    /// Mark one level completed and persist. An out-of-range index is
    /// a no-op. Returns the resulting record either way.
    pub fn mark_completed(&self, level_index: usize, levels: usize) -> Vec<bool> {
        let mut record = self.load(levels);
        if level_index < levels {
            record[level_index] = true;
            self.save(&record);
        }
        record
    }

    /// Remove the stored record entirely, so only level 1 is unlocked
    /// on the next load.
    pub fn clear(&self) {
        if let Err(err) = fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), %err, "progress reset with nothing stored");
        }
    }
}

/// JSON truthiness, matching how the record was coerced historically:
/// false, null, 0 and "" are false, everything else is true.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ProgressStore {
        ProgressStore::new(dir.path().join("progress.json"))
    }

    #[test]
    fn missing_file_loads_all_false() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).load(5), vec![false; 5]);
    }

    #[test]
    fn malformed_payloads_load_all_false() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        for raw in ["not json at all", "{\"done\": true}", "42", "\"true\""] {
            fs::write(dir.path().join("progress.json"), raw).unwrap();
            assert_eq!(s.load(5), vec![false; 5], "payload: {raw}");
        }
    }

    #[test]
    fn wrong_length_arrays_are_truncated_or_padded() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);

        fs::write(dir.path().join("progress.json"), "[true, true]").unwrap();
        assert_eq!(s.load(5), vec![true, true, false, false, false]);

        fs::write(
            dir.path().join("progress.json"),
            "[true, false, true, false, true, true, true]",
        )
        .unwrap();
        assert_eq!(s.load(5), vec![true, false, true, false, true]);
    }

    #[test]
    fn non_bool_entries_are_coerced() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("progress.json"),
            "[1, 0, \"yes\", \"\", null]",
        )
        .unwrap();
        assert_eq!(store(&dir).load(5), vec![true, false, true, false, false]);
    }

    #[test]
    fn zero_levels_loads_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("progress.json"), "[true, true]").unwrap();
        assert_eq!(store(&dir).load(0), Vec::<bool>::new());
    }

    #[test]
    fn mark_completed_sets_only_that_index() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        let before = s.load(5);

        let after = s.mark_completed(2, 5);
        assert_eq!(after, vec![false, false, true, false, false]);
        assert_eq!(s.load(5), after);

        // every other index unchanged from the prior load
        for (i, (&a, &b)) in before.iter().zip(after.iter()).enumerate() {
            if i != 2 {
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn mark_completed_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        let once = s.mark_completed(1, 5);
        let twice = s.mark_completed(1, 5);
        assert_eq!(once, twice);
    }

    #[test]
    fn mark_completed_out_of_range_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.save(&[true, false, false, false, false]);
        let record = s.mark_completed(7, 5);
        assert_eq!(record, vec![true, false, false, false, false]);
        assert_eq!(s.load(5), record);
    }

    #[test]
    fn clear_resets_to_all_false() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.mark_completed(0, 5);
        s.mark_completed(1, 5);
        s.clear();
        assert_eq!(s.load(5), vec![false; 5]);
    }

    #[test]
    fn clear_without_stored_record_is_harmless() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.clear();
        assert_eq!(s.load(5), vec![false; 5]);
    }
}
