//! Inspecting a root and reaping entries left behind by crashed holders.
//!
//! A holder that dies never runs its release, so its entry stays on disk with
//! a lock file nobody holds. Nothing in the acquire/release protocol notices
//! that; these operations are the explicit way to find and remove such
//! entries.

use super::{Coordinator, LOCK_FILE_NAME};
use crate::error::{Error, Result, combine};
use crate::lock::{self, FileLock};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What classifying one entry directory found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    /// At least one holder has a live claim.
    InUse,
    /// Lock file present, no holders.
    Orphaned,
    /// No lock file: the creator died before registering.
    Incomplete,
    /// A creator is inside its factory right now.
    Busy,
}

impl EntryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryState::InUse => "in use",
            EntryState::Orphaned => "orphaned",
            EntryState::Incomplete => "incomplete",
            EntryState::Busy => "busy",
        }
    }

    /// Whether `sweep` removes entries in this state.
    pub fn is_reapable(&self) -> bool {
        matches!(self, EntryState::Orphaned | EntryState::Incomplete)
    }
}

impl std::fmt::Display for EntryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryStatus {
    pub key: String,
    pub path: PathBuf,
    pub state: EntryState,
}

impl Coordinator {
    /// List every entry under the root with its current state.
    ///
    /// Holds the root lock for the duration, so no entry is created or removed
    /// while the listing runs. A root that does not exist yet has no entries.
    pub fn entries(&self) -> Result<Vec<EntryStatus>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        lock::with_exclusive(&self.root, || {
            let mut statuses = Vec::new();
            let mut errors = Vec::new();

            for (key, path) in self.entry_dirs()? {
                match classify_entry(&path) {
                    Ok((state, held)) => {
                        errors.extend(release_all(held).err());
                        statuses.push(EntryStatus { key, path, state });
                    }
                    Err(e) => errors.push(e),
                }
            }

            Error::join(errors)?;
            Ok(statuses)
        })
    }

    /// Remove every entry that has no holders and no creator at work.
    ///
    /// Cleanup closures are never run here; they only exist inside the
    /// processes that registered them. Returns the removed directories.
    pub fn sweep(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        lock::with_exclusive(&self.root, || {
            let mut removed = Vec::new();
            let mut errors = Vec::new();

            for (key, path) in self.entry_dirs()? {
                let (state, held) = match classify_entry(&path) {
                    Ok(classified) => classified,
                    Err(e) => {
                        errors.push(e);
                        continue;
                    }
                };

                // The lock on the lock file must be gone before removal,
                // the directory lock must outlive it.
                let mut held = held.into_iter();
                let dir_lock = held.next();
                errors.extend(release_all(held.collect()).err());

                if state.is_reapable() {
                    match fs::remove_dir_all(&path) {
                        Ok(()) => {
                            tracing::info!(key, %state, "swept entry");
                            removed.push(path);
                        }
                        Err(e) => errors.push(Error::filesystem(
                            format!("failed to remove '{}'", path.display()),
                            e,
                        )),
                    }
                }

                if let Some(dir_lock) = dir_lock {
                    errors.extend(dir_lock.unlock().err());
                }
            }

            Error::join(errors)?;
            Ok(removed)
        })
    }

    fn entry_dirs(&self) -> Result<Vec<(String, PathBuf)>> {
        let read_dir = fs::read_dir(&self.root).map_err(|e| {
            Error::filesystem(format!("failed to read '{}'", self.root.display()), e)
        })?;

        let mut dirs = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| {
                Error::filesystem(format!("failed to read '{}'", self.root.display()), e)
            })?;
            let path = entry.path();
            if path.is_dir() {
                dirs.push((entry.file_name().to_string_lossy().into_owned(), path));
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}

/// Classify one entry. The caller holds the root lock.
///
/// Returns the locks taken along the way, directory lock first, so the caller
/// decides when to drop them.
fn classify_entry(entry_dir: &Path) -> Result<(EntryState, Vec<FileLock>)> {
    let dir_lock = match lock::try_lock_exclusive(entry_dir) {
        Ok(lock) => lock,
        Err(e) if e.is_would_block() => return Ok((EntryState::Busy, Vec::new())),
        Err(e) => return Err(e),
    };

    let lock_file = entry_dir.join(LOCK_FILE_NAME);
    if !lock_file.is_file() {
        return Ok((EntryState::Incomplete, vec![dir_lock]));
    }

    match lock::try_lock_exclusive(&lock_file) {
        Ok(unheld) => Ok((EntryState::Orphaned, vec![dir_lock, unheld])),
        Err(e) if e.is_would_block() => Ok((EntryState::InUse, vec![dir_lock])),
        Err(e) => combine(Err(e), dir_lock.unlock()),
    }
}

/// Release in reverse order of acquisition.
fn release_all(locks: Vec<FileLock>) -> Result<()> {
    Error::join(
        locks
            .into_iter()
            .rev()
            .filter_map(|lock| lock.unlock().err())
            .collect(),
    )
}
