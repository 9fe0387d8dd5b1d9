//! Maildir store access.
//!
//! Messages are read from the `cur/` and `new/` subdirectories of a maildir
//! (or from the directory itself when it has neither). A message's storage
//! name is its path relative to the maildir root, so seen-state renames stay
//! inside the store.

use crate::error::{Error, Result};
use crate::message::{Message, StoreMutator};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Subdirectories holding delivered messages.
const MESSAGE_DIRS: [&str; 2] = ["cur", "new"];

/// A file that could not be turned into a message.
#[derive(Debug)]
pub struct ScanFailure {
    /// Path of the file.
    pub path: PathBuf,
    /// What went wrong.
    pub error: Error,
}

/// Result of scanning a maildir.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Messages, ordered by file name.
    pub messages: Vec<Message>,
    /// Files that were skipped.
    pub failures: Vec<ScanFailure>,
}

/// Scans a maildir.
///
/// Each file is parsed on its own; a file that fails is recorded in
/// [`ScanReport::failures`] and the scan continues.
///
/// # Errors
///
/// Returns an error if a message directory cannot be listed.
pub fn scan(root: &Path) -> Result<ScanReport> {
    let mut dirs: Vec<PathBuf> = MESSAGE_DIRS
        .iter()
        .map(|sub| root.join(sub))
        .filter(|dir| dir.is_dir())
        .collect();
    if dirs.is_empty() {
        dirs.push(root.to_path_buf());
    }

    let mut paths = Vec::new();
    for dir in &dirs {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let hidden = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with('.'));
            if path.is_file() && !hidden {
                paths.push(path);
            }
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut report = ScanReport::default();
    for path in paths {
        let storage_name = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();

        match read_message(&path) {
            Ok(message) => report
                .messages
                .push(message.with_storage_name(storage_name)),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping unreadable message");
                report.failures.push(ScanFailure { path, error });
            }
        }
    }

    tracing::debug!(
        root = %root.display(),
        messages = report.messages.len(),
        failures = report.failures.len(),
        "maildir scanned"
    );
    Ok(report)
}

/// Reads one message file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed.
pub fn read_message(path: &Path) -> Result<Message> {
    let file = File::open(path)?;
    Message::parse(BufReader::new(file))
}

/// Applies seen-state renames to files under a maildir root.
#[derive(Debug, Clone)]
pub struct MaildirStore {
    root: PathBuf,
}

impl MaildirStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl StoreMutator for MaildirStore {
    fn rename(&mut self, from: &str, to: &str) -> io::Result<()> {
        std::fs::rename(self.root.join(from), self.root.join(to))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mail::Mail;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    fn maildir() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        for sub in ["cur", "new", "tmp"] {
            std::fs::create_dir(root.path().join(sub)).unwrap();
        }
        root
    }

    #[test]
    fn test_scan_orders_by_file_name() {
        let root = maildir();
        let cur = root.path().join("cur");
        let new = root.path().join("new");
        write(&cur, "1700000002.b.host:2,S", "Subject: second\n\nb\n");
        write(&new, "1700000001.a.host", "Subject: first\n\na\n");
        write(&cur, "1700000003.c.host:2,", "Subject: third\n\nc\n");
        write(&root.path().join("tmp"), "1700000000.t.host", "Subject: tmp\n\nt\n");

        let report = scan(root.path()).unwrap();
        assert!(report.failures.is_empty());

        let subjects: Vec<&str> = report
            .messages
            .iter()
            .map(|m| m.subject().unwrap())
            .collect();
        assert_eq!(subjects, ["first", "second", "third"]);
        assert_eq!(
            report.messages[1].storage_name(),
            Some(Path::new("cur").join("1700000002.b.host:2,S").to_str().unwrap())
        );
        assert!(report.messages[1].is_seen());
    }

    #[test]
    fn test_scan_reports_bad_files_and_continues() {
        let root = maildir();
        let cur = root.path().join("cur");
        write(&cur, "a:2,", "Subject: ok\n\nbody\n");
        write(&cur, "b:2,", "not a header line\n\nbody\n");
        write(&cur, "c:2,", "Subject: also ok\n\nbody\n");

        let report = scan(root.path()).unwrap();
        assert_eq!(report.messages.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("b:2,"));
        assert!(matches!(report.failures[0].error, Error::Mime(_)));
    }

    #[test]
    fn test_scan_flat_directory() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "one:2,", "Subject: flat\n\nx\n");
        write(root.path(), ".hidden", "Subject: hidden\n\nx\n");

        let report = scan(root.path()).unwrap();
        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.messages[0].storage_name(), Some("one:2,"));
    }

    #[test]
    fn test_scan_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        assert!(scan(&root.path().join("nope")).is_err());
    }

    #[test]
    fn test_mark_seen_renames_file() {
        let root = maildir();
        let cur = root.path().join("cur");
        write(&cur, "1500000000.1234.host:2,", "Subject: Sample\n\nhello\n");

        let mut report = scan(root.path()).unwrap();
        let mut store = MaildirStore::new(root.path());
        let message = &mut report.messages[0];

        message.mark_seen(&mut store).unwrap().unwrap();
        assert!(cur.join("1500000000.1234.host:2,S").is_file());
        assert!(!cur.join("1500000000.1234.host:2,").exists());

        let rescanned = scan(root.path()).unwrap();
        assert!(rescanned.messages[0].is_seen());
        assert_eq!(rescanned.messages[0].render_full(), message.render_full());
    }
}
