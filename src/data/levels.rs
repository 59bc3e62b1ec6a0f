//! The campus level catalog
//!
//! Five buildings, five flags. Content is fixed at compile time; the
//! runner and the roadmap address it by index only.

use crate::{GameError, Result, TOTAL_LEVELS};

use super::{FileRef, LevelSpec};

/// Short map labels, in roadmap order.
pub const LEVEL_LABELS: [&str; TOTAL_LEVELS] = [
    "LIBRARY",
    "SERVER LAB",
    "CAFETERIA",
    "CAMPUS WEBSITE",
    "ADMIN OFFICE",
];

/// Fetch one level's configuration.
pub fn level(index: usize) -> Result<LevelSpec> {
    all()
        .into_iter()
        .nth(index)
        .ok_or_else(|| GameError::LevelNotFound(index).into())
}

/// The full catalog, in roadmap order.
pub fn all() -> Vec<LevelSpec> {
    vec![library(), server_lab(), cafeteria(), web_inspect(), admin_office()]
}

fn library() -> LevelSpec {
    let story = "Title: Study Notes\n\n\
The campus library's digital archive has been scrambled. Overnight, someone \
from ShadowRoot encrypted a set of research notes and left an obfuscated \
message that points to their next target. The librarian found a battered USB \
and uploaded one of the encrypted files to the terminal. Recover the hidden \
message from secret_note.txt. Submit the flag in the format flag{...}. You \
have limited time. Start the terminal when ready.\n";

    LevelSpec {
        title: "Library".to_string(),
        story: story.to_string(),
        expected_flag: "flag{Hello_Campus}".to_string(),
        duration_seconds: 10 * 60,
        hint_text: None,
        hint_penalty_seconds: 120,
        files: Vec::new(),
        file_url: None,
        file_name: None,
        secret_text: Some(
            "kqfl{Mjqqt_Hfruzx} Dtz mfaj bjqq ijhwduyji nsktwrfynts. \
Stb ymj kwfrjbtwp bnqq gj xfkj."
                .to_string(),
        ),
    }
}

fn server_lab() -> LevelSpec {
    let story = "Title: Traffic with a Tell-Tale Pattern\n\n\
The Server Lab team recovered a slice of network traffic logs after unusual \
activity was spotted on the campus portal. At first glance most requests look \
normal, but buried among them are requests that don't follow normal patterns. \
The admin suspects these requests are being used to move something off the \
network.\n\n\
Download the logfile, inspect the requests. Start the timer when you begin.\n\
If you use HINT a time penalty will be applied.\n";

    let log_text = concat!(
        "10.1.1.10 - - [2025-10-25T09:03:12Z] \"GET /index.html HTTP/1.1\" 200 452 \"-\" \"Mozilla/5.0 (Windows NT 10.0; Win64; x64)\"\n",
        "10.1.1.11 - - [2025-10-25T09:04:03Z] \"GET /assets/logo.png HTTP/1.1\" 200 10234 \"https://campus.edu\" \"curl/7.68.0\"\n",
        "172.16.0.2 - - [2025-10-25T09:10:21Z] \"POST /submit HTTP/1.1\" 200 12 \"https://portal.campus.edu\" \"Mozilla/5.0\" \"payload=eyJ1c2VyIjoiamRvZSIsImRhdGEiOiJabXhsYkc3dHNKMmJXbG5mQm05d1owPT0ifQ==\"\n",
        "10.1.1.12 - - [2025-10-25T09:11:09Z] \"GET /courses/intro HTTP/1.1\" 200 2048 \"-\" \"Mozilla/5.0\"\n",
        "192.168.5.5 - - [2025-10-25T09:12:30Z] \"POST /login HTTP/1.1\" 401 98 \"https://lms.campus.edu\" \"Mozilla/5.0\" \"username=student&password=wrong\"\n",
        "172.16.0.2 - - [2025-10-25T09:13:05Z] \"POST /upload HTTP/1.1\" 200 8 \"https://portal.campus.edu\" \"python-requests/2.25.1\" \"data=ZmxhZ3tzdG9sZW5fbm90ZXN9\"\n",
        "10.1.1.13 - - [2025-10-25T09:14:50Z] \"GET /status HTTP/1.1\" 200 64 \"-\" \"health-check/1.0\"\n",
    );

    LevelSpec {
        title: "Server Lab".to_string(),
        story: story.to_string(),
        expected_flag: "flag{stolen_notes}".to_string(),
        duration_seconds: 8 * 60,
        hint_text: Some(
            "How are the attackers trying to move data off the network? Look for \
repeated POST requests carrying encoded payloads (base64-like)."
                .to_string(),
        ),
        hint_penalty_seconds: 120,
        files: Vec::new(),
        file_url: None,
        file_name: None,
        secret_text: Some(log_text.to_string()),
    }
}

fn cafeteria() -> LevelSpec {
    let story = "Title: Coffee & Croissant\n\n\
A framed photo of a steaming cup of coffee and a flaky croissant hangs on the \
cafeteria wall, a comforting sight students pass every morning. Recently the \
archives team flagged that the file used for the wall display looks subtly \
different from the original. You're asked to take a closer look: open \
cafeteria_poster.png. Submit the flag before the timer runs out to help the \
cafeteria team restore trust in their materials.\n";

    LevelSpec {
        title: "Cafeteria".to_string(),
        story: story.to_string(),
        expected_flag: "flag{caf3t3r1a_s3cr3ts_4r3_tasty}".to_string(),
        duration_seconds: 7 * 60,
        hint_text: None,
        hint_penalty_seconds: 120,
        files: Vec::new(),
        file_url: Some("assets/cafeteria_poster.png".to_string()),
        file_name: Some("cafeteria_poster.png".to_string()),
        secret_text: None,
    }
}

fn web_inspect() -> LevelSpec {
    let story = "Title: Whispers on the Campus Site\n\n\
The campus website has been humming with small, unexplained updates. A page \
that used to be mundane now reads like a quiet riddle. The web team asked you \
to take a closer look.\n";

    LevelSpec {
        title: "Web Inspect".to_string(),
        story: story.to_string(),
        expected_flag: "flag{web_exploitation_practice}".to_string(),
        duration_seconds: 8 * 60,
        hint_text: Some("Have you heard about inspection?".to_string()),
        hint_penalty_seconds: 90,
        files: Vec::new(),
        file_url: Some("assets/web_explore/portal.html".to_string()),
        file_name: Some("portal.html".to_string()),
        secret_text: None,
    }
}

fn admin_office() -> LevelSpec {
    let story = "Title: Forgotten Backups\n\n\
You slip into the admin office after hours. Keys jingling, fluorescent hum in \
the hall. The IT team asked you to hunt through an old archive: during a \
long-ago maintenance someone copied a few config files into a public folder \
and then forgot to remove them. If you can recover the forgotten admin token \
from those dusty backups and use it in the Admin Console, you can prove the \
leak and force a shutdown of the intruder's systems.\n";

    LevelSpec {
        title: "Admin Office".to_string(),
        story: story.to_string(),
        expected_flag: "flag{admin_backup_leak}".to_string(),
        duration_seconds: 9 * 60,
        hint_text: Some("Search the backup for anything that looks like an admin secret.".to_string()),
        hint_penalty_seconds: 90,
        files: vec![
            FileRef::file("assets/admin/backup_config.txt", "backup_config.txt"),
            FileRef::file("assets/admin/admin_logs.txt", "admin_logs.txt"),
            FileRef::portal("assets/admin/console.html", "Admin Console"),
        ],
        file_url: None,
        file_name: None,
        secret_text: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_roadmap_node() {
        assert_eq!(all().len(), TOTAL_LEVELS);
        assert_eq!(LEVEL_LABELS.len(), TOTAL_LEVELS);
    }

    #[test]
    fn every_level_has_a_flag_and_a_deadline() {
        for spec in all() {
            assert!(spec.expected_flag.starts_with("flag{"), "{}", spec.title);
            assert!(spec.duration_seconds > 0, "{}", spec.title);
        }
    }

    #[test]
    fn every_level_resolves_at_least_one_resource() {
        let dir = tempfile::TempDir::new().unwrap();
        for (i, spec) in all().iter().enumerate() {
            let entries = super::super::resolve_resources(spec, i, dir.path());
            assert!(!entries.is_empty(), "{}", spec.title);
        }
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        assert!(level(TOTAL_LEVELS).is_err());
        assert!(level(0).is_ok());
    }
}
