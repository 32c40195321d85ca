//! Inbox directory scanning
//!
//! Polling detector that fires exactly once per delivered archive. A new
//! `.zip` name becomes a candidate on the first scan that sees it and fires
//! on the next scan where its size and mtime have not moved, so archives
//! still being written are left alone. Fired names stay muted while the
//! file remains in the inbox: a failed archive left in place is not
//! retried. Once the file leaves the directory the name is forgotten and a
//! re-delivery fires again.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

const ARCHIVE_EXTENSION: &str = "zip";

/// Size + mtime snapshot used for the write-stability gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileSignature {
    len: u64,
    modified: Option<SystemTime>,
}

#[derive(Debug)]
pub struct InboxScanner {
    dir: PathBuf,
    /// Names that already fired and are still present in the inbox.
    seen: HashSet<OsString>,
    /// Candidates awaiting a stable second observation.
    pending: HashMap<OsString, FileSignature>,
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .map(|extension| extension.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
        .unwrap_or(false)
}

impl InboxScanner {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            seen: HashSet::new(),
            pending: HashMap::new(),
        }
    }

    /// Absorb archives already sitting in the inbox so they never fire.
    ///
    /// Only archives delivered after startup are handled; anything present
    /// beforehand is the operator's to resubmit. Returns how many names
    /// were absorbed.
    pub fn baseline(&mut self) -> io::Result<usize> {
        let listing = self.snapshot()?;
        let count = listing.len();
        self.seen = listing.into_keys().collect();
        self.pending.clear();
        Ok(count)
    }

    /// One scan pass. Returns the archives that fired, sorted by path.
    pub fn poll(&mut self) -> io::Result<Vec<PathBuf>> {
        let listing = self.snapshot()?;

        // Names that left the inbox become eligible to fire again on
        // re-delivery.
        self.seen.retain(|name| listing.contains_key(name));
        self.pending.retain(|name, _| listing.contains_key(name));

        let mut fired = Vec::new();
        for (name, (path, signature)) in listing {
            if self.seen.contains(&name) {
                continue;
            }
            match self.pending.get(&name) {
                Some(previous) if *previous == signature => {
                    self.pending.remove(&name);
                    self.seen.insert(name);
                    fired.push(path);
                }
                _ => {
                    debug!(file = %path.display(), "archive candidate, waiting for writes to settle");
                    self.pending.insert(name, signature);
                }
            }
        }

        fired.sort();
        Ok(fired)
    }

    fn snapshot(&self) -> io::Result<HashMap<OsString, (PathBuf, FileSignature)>> {
        let mut listing = HashMap::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !is_archive(&path) {
                continue;
            }
            // A file can vanish between the listing and the stat; skip it
            // and let the next scan sort it out.
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(_) => continue,
            };
            if !metadata.is_file() {
                continue;
            }
            let signature = FileSignature {
                len: metadata.len(),
                modified: metadata.modified().ok(),
            };
            listing.insert(entry.file_name(), (path, signature));
        }
        Ok(listing)
    }
}
