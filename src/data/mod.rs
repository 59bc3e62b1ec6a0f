//! Level configuration and challenge resources
//!
//! Levels are static content: a story, an expected flag, a duration,
//! and the artifacts the player gets to inspect. The challenge runner
//! consumes this read-only, by level index.

pub mod levels;

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A configured artifact reference for a level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRef {
    pub url: String,
    pub name: Option<String>,
    pub is_portal: bool,
    pub is_image: bool,
}

impl FileRef {
    pub fn file(url: &str, name: &str) -> Self {
        Self {
            url: url.to_string(),
            name: Some(name.to_string()),
            is_portal: false,
            is_image: false,
        }
    }

    pub fn portal(url: &str, name: &str) -> Self {
        Self {
            url: url.to_string(),
            name: Some(name.to_string()),
            is_portal: true,
            is_image: false,
        }
    }
}

/// Static configuration for one level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSpec {
    pub title: String,
    pub story: String,
    pub expected_flag: String,
    pub duration_seconds: u64,
    pub hint_text: Option<String>,
    pub hint_penalty_seconds: u64,
    /// Explicit artifact list. Takes priority over `file_url`.
    pub files: Vec<FileRef>,
    /// Single artifact reference, used when `files` is empty.
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    /// Inline secret, materialized into the downloads folder on start
    /// when no artifact reference is configured.
    pub secret_text: Option<String>,
}

/// One exposed artifact for an active challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub url: String,
    pub name: String,
    /// External link to open rather than a file to download.
    pub is_portal: bool,
    /// Render inline as a preview.
    pub is_image: bool,
    /// Written to the downloads folder from inline secret text.
    pub materialized: bool,
}

static PORTAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(portal\.html|console\.html|index\.html)$").unwrap());
static IMAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.(png|jpe?g|gif|webp|svg)$").unwrap());

fn portal_like(name: &str) -> bool {
    PORTAL_RE.is_match(name)
}

fn image_like(name: &str) -> bool {
    IMAGE_RE.is_match(name)
}

fn last_segment(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

/// Resolve the artifacts a level exposes once its terminal is started.
///
/// Priority: explicit file list, then single file reference, then
/// inline secret text written out as `level{N}_secret.txt`. When any
/// configured entry is portal-like, only portal-like entries are
/// exposed. Materialization is best-effort: if the secret file cannot
/// be written the entry is simply omitted.
pub fn resolve_resources(
    spec: &LevelSpec,
    level_index: usize,
    downloads_dir: &Path,
) -> Vec<ResourceEntry> {
    let mut resolved = Vec::new();

    if !spec.files.is_empty() {
        let has_portal = spec
            .files
            .iter()
            .any(|f| f.is_portal || portal_like(&f.url));
        for f in &spec.files {
            let portal = f.is_portal || portal_like(&f.url);
            if has_portal && !portal {
                continue;
            }
            resolved.push(ResourceEntry {
                url: f.url.clone(),
                name: f.name.clone().unwrap_or_else(|| last_segment(&f.url)),
                is_portal: portal,
                is_image: f.is_image || image_like(&f.url),
                materialized: false,
            });
        }
    } else if let Some(url) = &spec.file_url {
        resolved.push(ResourceEntry {
            url: url.clone(),
            name: spec
                .file_name
                .clone()
                .unwrap_or_else(|| last_segment(url)),
            is_portal: spec.file_name.as_deref().is_some_and(portal_like),
            is_image: image_like(url),
            materialized: false,
        });
    } else if let Some(secret) = spec.secret_text.as_deref().filter(|s| !s.is_empty()) {
        let name = format!("level{}_secret.txt", level_index + 1);
        let path = downloads_dir.join(&name);
        let written = fs::create_dir_all(downloads_dir)
            .and_then(|_| fs::write(&path, secret));
        match written {
            Ok(()) => resolved.push(ResourceEntry {
                url: path.display().to_string(),
                name,
                is_portal: false,
                is_image: false,
                materialized: true,
            }),
            Err(err) => warn!(path = %path.display(), %err, "could not materialize secret file"),
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bare_spec() -> LevelSpec {
        LevelSpec {
            title: "Test".into(),
            story: "story".into(),
            expected_flag: "flag{t}".into(),
            duration_seconds: 60,
            hint_text: None,
            hint_penalty_seconds: 0,
            files: Vec::new(),
            file_url: None,
            file_name: None,
            secret_text: None,
        }
    }

    #[test]
    fn portal_entry_hides_plain_files() {
        let dir = TempDir::new().unwrap();
        let mut spec = bare_spec();
        spec.files = vec![
            FileRef::file("assets/backup_config.txt", "backup_config.txt"),
            FileRef::file("assets/admin_logs.txt", "admin_logs.txt"),
            FileRef::portal("assets/console.html", "Admin Console"),
        ];
        let entries = resolve_resources(&spec, 4, dir.path());
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_portal);
        assert_eq!(entries[0].name, "Admin Console");
    }

    #[test]
    fn all_plain_files_are_exposed_when_no_portal() {
        let dir = TempDir::new().unwrap();
        let mut spec = bare_spec();
        spec.files = vec![
            FileRef::file("assets/a.txt", "a.txt"),
            FileRef::file("assets/b.txt", "b.txt"),
        ];
        assert_eq!(resolve_resources(&spec, 0, dir.path()).len(), 2);
    }

    #[test]
    fn portal_filename_pattern_matches_without_flag() {
        let dir = TempDir::new().unwrap();
        let mut spec = bare_spec();
        spec.files = vec![
            FileRef::file("assets/notes.txt", "notes.txt"),
            FileRef::file("assets/web/PORTAL.HTML", "campus portal"),
        ];
        let entries = resolve_resources(&spec, 0, dir.path());
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_portal);
    }

    #[test]
    fn single_file_reference_detects_images() {
        let dir = TempDir::new().unwrap();
        let mut spec = bare_spec();
        spec.file_url = Some("assets/cafeteria_poster.png".into());
        spec.file_name = Some("cafeteria_poster.png".into());
        let entries = resolve_resources(&spec, 2, dir.path());
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_image);
        assert!(!entries[0].is_portal);
    }

    #[test]
    fn single_file_name_defaults_to_last_url_segment() {
        let dir = TempDir::new().unwrap();
        let mut spec = bare_spec();
        spec.file_url = Some("assets/web_explore/portal.html".into());
        let entries = resolve_resources(&spec, 3, dir.path());
        assert_eq!(entries[0].name, "portal.html");
        // portal detection for a single reference keys off the
        // configured name, which is absent here
        assert!(!entries[0].is_portal);
    }

    #[test]
    fn secret_text_is_materialized_with_synthesized_name() {
        let dir = TempDir::new().unwrap();
        let mut spec = bare_spec();
        spec.secret_text = Some("kqfl{...}".into());
        let entries = resolve_resources(&spec, 0, dir.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "level1_secret.txt");
        assert!(entries[0].materialized);
        let on_disk = fs::read_to_string(dir.path().join("level1_secret.txt")).unwrap();
        assert_eq!(on_disk, "kqfl{...}");
    }

    #[test]
    fn empty_secret_resolves_to_nothing() {
        let dir = TempDir::new().unwrap();
        let mut spec = bare_spec();
        spec.secret_text = Some(String::new());
        assert!(resolve_resources(&spec, 0, dir.path()).is_empty());
    }
}
